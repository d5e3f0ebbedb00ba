//! NATS-fed session tracker.
//!
//! [`SessionTracker`] follows the session event bus and answers the
//! [`SessionRuntime`] queries from its last-seen state. Scene transitions and
//! session ends fire the registered teardown listeners with the key of the
//! scope that just ended.

use std::sync::{PoisonError, RwLock};

use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use keystone_host::{SceneId, ScopeKey, SessionId};

use crate::connection::Connection;
use crate::error::SessionError;
use crate::messages::{AuthorityChanged, SceneChanged, SessionEnded, SessionStarted};
use crate::runtime::{SessionRuntime, TeardownListener};
use crate::subjects;

/// Last-seen session state.
#[derive(Debug)]
struct TrackerState {
    session: SessionId,
    scene: SceneId,
    /// Participant id of the current authority, if one has been announced.
    authority_holder: Option<String>,
}

/// A [`SessionRuntime`] driven by session bus events.
///
/// The tracker follows one session at a time: a [`SessionStarted`] event
/// adopts the announced session (ending the previous one), while scene and
/// authority events for foreign sessions are ignored. All `apply_*`
/// transitions are idempotent, so the authority may apply its own
/// announcements locally and also receive them echoed from the bus.
pub struct SessionTracker {
    /// Unique participant identifier for this process.
    participant_id: String,
    state: RwLock<TrackerState>,
    listeners: RwLock<Vec<TeardownListener>>,
}

impl SessionTracker {
    /// Create a tracker starting in the given session and scene.
    #[must_use]
    pub fn new(session: SessionId, scene: SceneId) -> Self {
        Self {
            participant_id: Uuid::new_v4().to_string(),
            state: RwLock::new(TrackerState {
                session,
                scene,
                authority_holder: None,
            }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Returns the unique participant id for this process.
    #[must_use]
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Adopt a newly started session, ending the previous one.
    pub fn apply_started(&self, event: &SessionStarted) {
        let ended = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.session == event.session {
                return;
            }
            let previous = state.session;
            state.session = event.session;
            state.scene = event.scene;
            state.authority_holder = Some(event.authority.clone());
            ScopeKey::Session(previous)
        };
        info!(session = %event.session, scene = %event.scene, "session started");
        self.fire_teardown(&ended);
    }

    /// Move to a different scene within the current session.
    pub fn apply_scene(&self, event: &SceneChanged) {
        let ended = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.session != event.session {
                debug!(session = %event.session, "ignoring scene change for foreign session");
                return;
            }
            if state.scene == event.scene {
                return;
            }
            let previous = state.scene;
            state.scene = event.scene;
            ScopeKey::SessionScene(state.session, previous)
        };
        info!(scene = %event.scene, "scene changed");
        self.fire_teardown(&ended);
    }

    /// End the current session.
    ///
    /// The tracker rolls to a fresh local session id so late accessors land
    /// in a new scope rather than the stale one.
    pub fn apply_ended(&self, event: &SessionEnded) {
        let ended = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.session != event.session {
                debug!(session = %event.session, "ignoring end of foreign session");
                return;
            }
            state.session = SessionId::random();
            state.authority_holder = None;
            ScopeKey::Session(event.session)
        };
        info!(session = %event.session, "session ended");
        self.fire_teardown(&ended);
    }

    /// Record a change of session authority.
    pub fn apply_authority(&self, event: &AuthorityChanged) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.session != event.session {
            debug!(session = %event.session, "ignoring authority change for foreign session");
            return;
        }
        state.authority_holder = Some(event.holder.clone());
    }

    /// Publish a scene change for the current session and apply it locally.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if encoding or publishing fails.
    pub async fn announce_scene(
        &self,
        conn: &Connection,
        scene: SceneId,
    ) -> Result<(), SessionError> {
        let event = SceneChanged {
            session: self.current_session_id(),
            scene,
        };
        conn.publish(subjects::SCENE_CHANGED, &event).await?;
        self.apply_scene(&event);
        Ok(())
    }

    /// Publish the end of the current session and apply it locally.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if encoding or publishing fails.
    pub async fn announce_end(&self, conn: &Connection) -> Result<(), SessionError> {
        let event = SessionEnded {
            session: self.current_session_id(),
        };
        conn.publish(subjects::SESSION_ENDED, &event).await?;
        self.apply_ended(&event);
        Ok(())
    }

    /// Follow the session bus until the subscription closes.
    ///
    /// Subscribes to every session event with a single wildcard and applies
    /// them in arrival order. Undecodable payloads are logged and skipped —
    /// one malformed event must not tear down scope tracking.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Subscribe`] if the subscription fails.
    pub async fn run(&self, conn: &Connection) -> Result<(), SessionError> {
        let mut sub = conn.subscribe(subjects::ALL_EVENTS).await?;
        info!(subject = subjects::ALL_EVENTS, "session tracker following bus");

        while let Some(msg) = sub.next().await {
            let payload = msg.payload.as_ref();
            let subject: &str = &msg.subject;
            let outcome = match subject {
                subjects::SESSION_STARTED => {
                    crate::codec::decode::<SessionStarted>(payload).map(|e| self.apply_started(&e))
                }
                subjects::SESSION_ENDED => {
                    crate::codec::decode::<SessionEnded>(payload).map(|e| self.apply_ended(&e))
                }
                subjects::SCENE_CHANGED => {
                    crate::codec::decode::<SceneChanged>(payload).map(|e| self.apply_scene(&e))
                }
                subjects::AUTHORITY_CHANGED => crate::codec::decode::<AuthorityChanged>(payload)
                    .map(|e| self.apply_authority(&e)),
                other => {
                    debug!(subject = other, "unrecognised session subject");
                    Ok(())
                }
            };
            if let Err(error) = outcome {
                warn!(subject, %error, "dropping malformed session event");
            }
        }

        Ok(())
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

impl SessionRuntime for SessionTracker {
    fn current_session_id(&self) -> SessionId {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
    }

    fn current_scene_id(&self) -> SceneId {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .scene
    }

    fn is_authority(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.authority_holder.as_deref() == Some(self.participant_id.as_str())
    }

    fn on_scope_teardown(&self, listener: TeardownListener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn tracker() -> SessionTracker {
        SessionTracker::new(SessionId::random(), SceneId::from_name("lobby"))
    }

    fn collect_teardowns(tracker: &SessionTracker) -> Arc<Mutex<Vec<ScopeKey>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_listener = Arc::clone(&seen);
        tracker.on_scope_teardown(Arc::new(move |key| {
            seen_by_listener.lock().unwrap().push(*key);
        }));
        seen
    }

    #[test]
    fn test_scene_change_ends_previous_scene_scope() {
        let tracker = tracker();
        let session = tracker.current_session_id();
        let seen = collect_teardowns(&tracker);

        tracker.apply_scene(&SceneChanged {
            session,
            scene: SceneId::from_name("arena"),
        });

        assert_eq!(tracker.current_scene_id(), SceneId::from_name("arena"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ScopeKey::SessionScene(session, SceneId::from_name("lobby"))]
        );
    }

    #[test]
    fn test_scene_change_is_idempotent() {
        let tracker = tracker();
        let session = tracker.current_session_id();
        let seen = collect_teardowns(&tracker);

        let event = SceneChanged {
            session,
            scene: SceneId::from_name("arena"),
        };
        tracker.apply_scene(&event);
        tracker.apply_scene(&event);

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_foreign_session_scene_change_ignored() {
        let tracker = tracker();
        let seen = collect_teardowns(&tracker);

        tracker.apply_scene(&SceneChanged {
            session: SessionId::random(),
            scene: SceneId::from_name("arena"),
        });

        assert_eq!(tracker.current_scene_id(), SceneId::from_name("lobby"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_session_end_rolls_fresh_session() {
        let tracker = tracker();
        let old = tracker.current_session_id();
        let seen = collect_teardowns(&tracker);

        tracker.apply_ended(&SessionEnded { session: old });

        assert_ne!(tracker.current_session_id(), old);
        assert_eq!(*seen.lock().unwrap(), vec![ScopeKey::Session(old)]);
    }

    #[test]
    fn test_started_adopts_new_session_and_ends_old() {
        let tracker = tracker();
        let old = tracker.current_session_id();
        let seen = collect_teardowns(&tracker);

        let next = SessionId::random();
        tracker.apply_started(&SessionStarted {
            session: next,
            scene: SceneId::from_name("arena"),
            authority: "someone".to_string(),
        });

        assert_eq!(tracker.current_session_id(), next);
        assert_eq!(tracker.current_scene_id(), SceneId::from_name("arena"));
        assert_eq!(*seen.lock().unwrap(), vec![ScopeKey::Session(old)]);
    }

    #[test]
    fn test_authority_tracking() {
        let tracker = tracker();
        let session = tracker.current_session_id();
        assert!(!tracker.is_authority());

        tracker.apply_authority(&AuthorityChanged {
            session,
            holder: tracker.participant_id().to_string(),
        });
        assert!(tracker.is_authority());

        tracker.apply_authority(&AuthorityChanged {
            session,
            holder: "someone-else".to_string(),
        });
        assert!(!tracker.is_authority());
    }
}
