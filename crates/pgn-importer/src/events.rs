//! Tagged PGN event stream and the accumulator that folds it into games.

use std::collections::HashSet;

use chess_core::game_data::GameRecord;

/// One token-level event from the PGN source, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    GameStart,
    Header { key: String, value: String },
    Move(String),
    GameEnd,
}

/// Collects headers and SAN tokens between `GameStart` and `GameEnd`.
#[derive(Debug, Default)]
pub struct GameAccumulator {
    excluded: HashSet<String>,
    current: GameRecord,
}

impl GameAccumulator {
    pub fn new<I, S>(excluded_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded_tags.into_iter().map(Into::into).collect(),
            current: GameRecord::default(),
        }
    }

    /// Apply one event. Returns the finished record on `GameEnd`.
    pub fn handle(&mut self, event: GameEvent) -> Option<GameRecord> {
        match event {
            GameEvent::GameStart => {
                self.current = GameRecord::default();
                None
            }
            GameEvent::Header { key, value } => {
                if !self.excluded.contains(&key) {
                    self.current.headers.insert(key, value);
                }
                None
            }
            GameEvent::Move(token) => {
                self.current.moves.push(token);
                None
            }
            GameEvent::GameEnd => Some(std::mem::take(&mut self.current)),
        }
    }
}
