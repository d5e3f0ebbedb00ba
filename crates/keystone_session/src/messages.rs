//! Event types exchanged between session participants.
//!
//! All events derive `Serialize` and `Deserialize` for MessagePack
//! transport. The session they apply to rides in the payload, so a single
//! wildcard subscription can serve any number of concurrent sessions.

use keystone_host::{SceneId, SessionId};
use serde::{Deserialize, Serialize};

/// A new session has begun.
/// Published on [`subjects::SESSION_STARTED`](crate::subjects::SESSION_STARTED).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    /// The new session.
    pub session: SessionId,
    /// The scene the session opens in.
    pub scene: SceneId,
    /// Participant identifier of the session authority.
    pub authority: String,
}

/// The session has ended.
/// Published on [`subjects::SESSION_ENDED`](crate::subjects::SESSION_ENDED).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnded {
    /// The session that ended.
    pub session: SessionId,
}

/// The session moved to a different scene.
/// Published on [`subjects::SCENE_CHANGED`](crate::subjects::SCENE_CHANGED).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneChanged {
    /// The session the transition belongs to.
    pub session: SessionId,
    /// The scene that is now current.
    pub scene: SceneId,
}

/// The authoritative participant changed.
/// Published on [`subjects::AUTHORITY_CHANGED`](crate::subjects::AUTHORITY_CHANGED).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityChanged {
    /// The session the change belongs to.
    pub session: SessionId,
    /// Participant identifier of the new authority.
    pub holder: String,
}
