//! Converts PGN game archives into a SQLite store of labeled, binary-encoded
//! board positions.
//!
//! Each game yields one `game_summary` row and, when every move replays, one
//! `position_fact` row per ply. Re-running over the same input resumes after
//! the games already committed.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod resume;
pub mod source;

pub use config::ImportConfig;
pub use db::PositionStore;
pub use error::ImportError;
pub use pipeline::{GameOutcome, ImportStats, Importer};
