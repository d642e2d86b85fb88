//! Replays a game's SAN tokens from the standard starting position.

use shakmaty::fen::Fen;
use shakmaty::san::{ParseSanError, SanError, SanPlus};
use shakmaty::{Chess, EnPassantMode, Position};
use thiserror::Error;

use crate::game_data::GameRecord;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("invalid SAN '{token}' at ply {ply}: {source}")]
    InvalidSan {
        ply: usize,
        token: String,
        source: ParseSanError,
    },

    #[error("illegal move '{token}' at ply {ply}: {source}")]
    IllegalMove {
        ply: usize,
        token: String,
        source: SanError,
    },

    #[error("move '{token}' at ply {ply} could not be played")]
    Unplayable { ply: usize, token: String },
}

impl ReplayError {
    pub fn ply(&self) -> usize {
        match self {
            ReplayError::InvalidSan { ply, .. }
            | ReplayError::IllegalMove { ply, .. }
            | ReplayError::Unplayable { ply, .. } => *ply,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            ReplayError::InvalidSan { token, .. }
            | ReplayError::IllegalMove { token, .. }
            | ReplayError::Unplayable { token, .. } => token,
        }
    }
}

/// Board reached after playing move number `ply` (1-indexed half-move).
#[derive(Debug, Clone)]
pub struct ReplayedPosition {
    pub ply: usize,
    pub position: Chess,
}

impl ReplayedPosition {
    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }
}

/// Parse `token` against `pos` and play it.
pub fn apply_san(pos: &Chess, token: &str, ply: usize) -> Result<Chess, ReplayError> {
    let san_plus: SanPlus = token.parse().map_err(|source| ReplayError::InvalidSan {
        ply,
        token: token.to_string(),
        source,
    })?;

    let mv = san_plus.san.to_move(pos).map_err(|source| ReplayError::IllegalMove {
        ply,
        token: token.to_string(),
        source,
    })?;

    pos.clone().play(mv).map_err(|_| ReplayError::Unplayable {
        ply,
        token: token.to_string(),
    })
}

/// Lazy, single-pass iterator over the positions of one game.
///
/// Yields one `Ok` per move until the moves run out or a move fails; a failure
/// is yielded once and the iterator is exhausted afterwards.
pub struct Replay<'a> {
    moves: std::slice::Iter<'a, String>,
    position: Chess,
    ply: usize,
    failed: bool,
}

impl<'a> Replay<'a> {
    pub fn new(record: &'a GameRecord) -> Self {
        Self {
            moves: record.moves.iter(),
            position: Chess::default(),
            ply: 0,
            failed: false,
        }
    }
}

impl Iterator for Replay<'_> {
    type Item = Result<ReplayedPosition, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let token = self.moves.next()?;
        let ply = self.ply + 1;

        match apply_san(&self.position, token, ply) {
            Ok(next) => {
                self.position = next;
                self.ply = ply;
                Some(Ok(ReplayedPosition {
                    ply,
                    position: self.position.clone(),
                }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.moves.len()))
        }
    }
}

pub fn replay(record: &GameRecord) -> Replay<'_> {
    Replay::new(record)
}
