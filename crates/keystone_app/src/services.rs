//! Demo services managed as singletons.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use keystone_host::Service;

/// Drives match flow; one per session.
#[derive(Debug, Default)]
pub struct MatchDirector {
    round: AtomicU32,
}

impl MatchDirector {
    /// Advance to the next round, returning its number.
    pub fn advance_round(&self) -> u32 {
        self.round.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the current round number.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round.load(Ordering::SeqCst)
    }
}

impl Service for MatchDirector {
    fn type_name() -> &'static str {
        "MatchDirector"
    }
}

/// Accumulates points; one per scene.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    total: AtomicU64,
}

impl ScoreBoard {
    /// Add points, returning the new total.
    pub fn add_points(&self, points: u64) -> u64 {
        self.total.fetch_add(points, Ordering::SeqCst) + points
    }

    /// Returns the accumulated total.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }
}

impl Service for ScoreBoard {
    fn type_name() -> &'static str {
        "ScoreBoard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_advances() {
        let director = MatchDirector::default();
        assert_eq!(director.round(), 0);
        assert_eq!(director.advance_round(), 1);
        assert_eq!(director.advance_round(), 2);
    }

    #[test]
    fn test_scoreboard_accumulates() {
        let board = ScoreBoard::default();
        assert_eq!(board.add_points(10), 10);
        assert_eq!(board.add_points(5), 15);
        assert_eq!(board.total(), 15);
    }
}
