//! NATS subject hierarchy for session events.
//!
//! All session subjects are prefixed with `session.` to namespace within a
//! shared NATS cluster.

/// Root prefix for all session subjects.
pub const PREFIX: &str = "session";

// ── Session lifecycle ───────────────────────────────────────────────────────

/// A new session has begun. Authority → *.
pub const SESSION_STARTED: &str = "session.lifecycle.started";

/// The current session has ended. Authority → *.
pub const SESSION_ENDED: &str = "session.lifecycle.ended";

// ── Scene transitions ───────────────────────────────────────────────────────

/// The session moved to a different scene. Authority → *.
pub const SCENE_CHANGED: &str = "session.scene.changed";

// ── Authority ───────────────────────────────────────────────────────────────

/// The authoritative participant changed. Authority → *.
pub const AUTHORITY_CHANGED: &str = "session.authority.changed";

/// Wildcard covering every session event, for trackers that follow all of
/// them with a single subscription.
pub const ALL_EVENTS: &str = "session.>";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects_share_prefix() {
        for subject in [SESSION_STARTED, SESSION_ENDED, SCENE_CHANGED, AUTHORITY_CHANGED] {
            assert!(subject.starts_with(PREFIX));
        }
    }

    #[test]
    fn test_wildcard_covers_lifecycle() {
        // `session.>` matches any subject one or more tokens below `session`.
        assert!(ALL_EVENTS.starts_with(PREFIX));
        assert!(ALL_EVENTS.ends_with('>'));
    }
}
