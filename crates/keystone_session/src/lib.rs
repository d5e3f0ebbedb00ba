//! # keystone_session
//!
//! The networked-session runtime: answers "which session and scene is this
//! process in, and is it the authority?", and signals scope teardown when a
//! session ends or the scene changes.
//!
//! This crate provides:
//!
//! - [`SessionRuntime`] trait — the query surface the scope policies consume.
//! - [`subjects`] — NATS subject constants for session lifecycle events.
//! - [`messages`] — event types exchanged between session participants.
//! - [`codec`] — MessagePack serialisation/deserialisation helpers.
//! - [`connection`] — NATS connection management.
//! - [`SessionTracker`] — NATS-fed [`SessionRuntime`] implementation.
//! - [`StaticSession`] — fixed-state implementation for tests and
//!   single-process runs.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod runtime;
pub mod subjects;
pub mod tracker;

pub use codec::{decode, encode};
pub use connection::Connection;
pub use error::SessionError;
pub use runtime::{SessionRuntime, StaticSession, TeardownListener};
pub use tracker::SessionTracker;
