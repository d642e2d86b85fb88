//! Importer error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Encoding layout error: {0}")]
    Layout(#[from] chess_core::encoding::LayoutError),
}
