//! Scope identity — the lifetime domain a singleton instance belongs to.
//!
//! A scope answers "per what is there exactly one instance?": per process,
//! per networked session, or per (session, scene) pair. Scope keys are plain
//! data and serialisable so they can ride along in session events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::fnv1a_64;

/// A unique identifier for a networked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Allocate a fresh random session identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a scene within a session.
///
/// Derived from the scene's string name with FNV-1a 64-bit, the same way
/// [`ServiceTypeId`](crate::service::ServiceTypeId) derives type identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SceneId(pub u64);

impl SceneId {
    /// Compute the [`SceneId`] for a scene name.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a_64(name.as_bytes()))
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scene({:#018x})", self.0)
    }
}

/// The lifetime domain within which at most one instance of a service type
/// is guaranteed to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKey {
    /// One instance per process, independent of networking.
    Process,
    /// One instance per networked session; survives scene changes.
    Session(SessionId),
    /// One instance per (session, scene) pair; expires on scene change.
    SessionScene(SessionId, SceneId),
}

impl ScopeKey {
    /// Returns the session this scope belongs to, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::Process => None,
            Self::Session(session) | Self::SessionScene(session, _) => Some(*session),
        }
    }

    /// Returns `true` if a teardown of `ended` also ends this scope.
    ///
    /// Ending a session ends every scene scope inside it; ending a scene
    /// ends only that exact (session, scene) pair. The process scope never
    /// ends.
    #[must_use]
    pub fn is_within(&self, ended: &ScopeKey) -> bool {
        match (self, ended) {
            (Self::Session(a), Self::Session(b)) => a == b,
            (Self::SessionScene(a, _), Self::Session(b)) => a == b,
            (Self::SessionScene(a, x), Self::SessionScene(b, y)) => a == b && x == y,
            _ => false,
        }
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Session(session) => write!(f, "session:{session}"),
            Self::SessionScene(session, scene) => write!(f, "session:{session}/{scene}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_id_from_name_is_deterministic() {
        assert_eq!(SceneId::from_name("arena"), SceneId::from_name("arena"));
        assert_ne!(SceneId::from_name("arena"), SceneId::from_name("lobby"));
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::random(), SessionId::random());
    }

    #[test]
    fn test_scope_session_lookup() {
        let session = SessionId::random();
        assert_eq!(ScopeKey::Process.session_id(), None);
        assert_eq!(ScopeKey::Session(session).session_id(), Some(session));
        assert_eq!(
            ScopeKey::SessionScene(session, SceneId::from_name("arena")).session_id(),
            Some(session)
        );
    }

    #[test]
    fn test_session_teardown_covers_its_scenes() {
        let session = SessionId::random();
        let scene = ScopeKey::SessionScene(session, SceneId::from_name("arena"));
        assert!(scene.is_within(&ScopeKey::Session(session)));
        assert!(ScopeKey::Session(session).is_within(&ScopeKey::Session(session)));
    }

    #[test]
    fn test_scene_teardown_is_exact() {
        let session = SessionId::random();
        let arena = ScopeKey::SessionScene(session, SceneId::from_name("arena"));
        let lobby = ScopeKey::SessionScene(session, SceneId::from_name("lobby"));
        assert!(arena.is_within(&arena));
        assert!(!lobby.is_within(&arena));
    }

    #[test]
    fn test_process_scope_never_ends() {
        let session = SessionId::random();
        assert!(!ScopeKey::Process.is_within(&ScopeKey::Session(session)));
        assert!(!ScopeKey::Process.is_within(&ScopeKey::Process));
    }

    #[test]
    fn test_foreign_session_not_covered() {
        let a = SessionId::random();
        let b = SessionId::random();
        let scene = ScopeKey::SessionScene(a, SceneId::from_name("arena"));
        assert!(!scene.is_within(&ScopeKey::Session(b)));
    }
}
