//! The session runtime surface consumed by scope policies.

use std::sync::{Arc, PoisonError, RwLock};

use keystone_host::{SceneId, ScopeKey, SessionId};
use tracing::debug;

/// A listener invoked when a scope ends, with the key of the ended scope.
pub type TeardownListener = Arc<dyn Fn(&ScopeKey) + Send + Sync>;

/// Queries and teardown signals the network-aware scope policies need.
///
/// Implementations must be callable from any thread; the answers describe
/// the *current* scope, so a caller racing a scene change simply lands in
/// whichever scope is current when it asks.
pub trait SessionRuntime: Send + Sync {
    /// The session this process currently belongs to.
    fn current_session_id(&self) -> SessionId;

    /// The scene currently loaded within the session.
    fn current_scene_id(&self) -> SceneId;

    /// Whether this process is the session authority.
    fn is_authority(&self) -> bool;

    /// Register a listener fired once per ended scope.
    fn on_scope_teardown(&self, listener: TeardownListener);
}

/// A [`SessionRuntime`] with locally-controlled state.
///
/// Used by tests and single-process runs: scene changes and session ends
/// are triggered by direct method calls instead of network events.
pub struct StaticSession {
    state: RwLock<(SessionId, SceneId)>,
    authority: bool,
    listeners: RwLock<Vec<TeardownListener>>,
}

impl StaticSession {
    /// Create a session fixed at the given ids, holding authority.
    #[must_use]
    pub fn new(session: SessionId, scene: SceneId) -> Self {
        Self {
            state: RwLock::new((session, scene)),
            authority: true,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Move to a different scene, ending the current (session, scene) scope.
    pub fn change_scene(&self, next: SceneId) {
        let ended = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let (session, previous) = *state;
            if previous == next {
                return;
            }
            state.1 = next;
            ScopeKey::SessionScene(session, previous)
        };
        debug!(ended = %ended, "scene scope ended");
        self.fire_teardown(&ended);
    }

    /// End the current session and begin a fresh one.
    ///
    /// Returns the id of the new session.
    pub fn end_session(&self) -> SessionId {
        let (ended, next) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let previous = state.0;
            let next = SessionId::random();
            state.0 = next;
            (ScopeKey::Session(previous), next)
        };
        debug!(ended = %ended, "session scope ended");
        self.fire_teardown(&ended);
        next
    }

    fn fire_teardown(&self, ended: &ScopeKey) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(ended);
        }
    }
}

impl SessionRuntime for StaticSession {
    fn current_session_id(&self) -> SessionId {
        self.state.read().unwrap_or_else(PoisonError::into_inner).0
    }

    fn current_scene_id(&self) -> SceneId {
        self.state.read().unwrap_or_else(PoisonError::into_inner).1
    }

    fn is_authority(&self) -> bool {
        self.authority
    }

    fn on_scope_teardown(&self, listener: TeardownListener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}
