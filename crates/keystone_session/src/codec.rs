//! MessagePack codec helpers.
//!
//! Thin wrappers around `rmp-serde`. All session event payloads use
//! MessagePack for compact binary serialisation.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Encode an event to MessagePack bytes.
///
/// # Errors
///
/// Returns [`SessionError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SessionError> {
    rmp_serde::to_vec(value).map_err(SessionError::Encode)
}

/// Decode an event from MessagePack bytes.
///
/// # Errors
///
/// Returns [`SessionError::Decode`] if deserialisation fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, SessionError> {
    rmp_serde::from_slice(bytes).map_err(SessionError::Decode)
}
