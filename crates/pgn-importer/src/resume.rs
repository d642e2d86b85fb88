//! Resume cursor: drops games already committed by an earlier run.
//!
//! Only valid while the input keeps its game order between runs. Appending
//! games is fine; reordering or removing games is not detected.

use chess_core::game_data::GameRecord;

#[derive(Debug, Clone, Copy)]
pub struct ResumeTracker {
    /// Games already present in the store when the run started
    cursor: u64,
    /// Games handed to the tracker so far, skipped or admitted
    seen: u64,
}

impl ResumeTracker {
    pub fn new(cursor: u64) -> Self {
        Self { cursor, seen: 0 }
    }

    /// Pass `record` through unless it was committed by a previous run.
    /// Either way the game counts as seen.
    pub fn admit(&mut self, record: GameRecord) -> Option<GameRecord> {
        let admitted = (self.seen >= self.cursor).then_some(record);
        self.seen += 1;
        admitted
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(site: &str) -> GameRecord {
        let mut record = GameRecord::default();
        record.headers.insert("Site".into(), site.into());
        record
    }

    #[test]
    fn test_fresh_run_admits_everything() {
        let mut tracker = ResumeTracker::new(0);
        assert!(tracker.admit(game("a")).is_some());
        assert!(tracker.admit(game("b")).is_some());
        assert_eq!(tracker.seen(), 2);
    }

    #[test]
    fn test_skips_exactly_cursor_games() {
        let mut tracker = ResumeTracker::new(2);
        assert!(tracker.admit(game("a")).is_none());
        assert!(tracker.admit(game("b")).is_none());
        assert_eq!(tracker.seen(), 2);

        let admitted = tracker.admit(game("c")).unwrap();
        assert_eq!(admitted.site(), Some("c"));
        assert_eq!(tracker.seen(), 3);
    }
}
