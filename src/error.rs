//! Errors at the edges of the game (configuration and storage)
//!
//! The simulation itself has no failure modes; bad input there is a no-op.

use thiserror::Error;

/// Rejected round configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("player count must be 1..={max}, got {found}")]
    PlayerCount { found: usize, max: usize },
    #[error("lives must be 1..={max}, got {found}")]
    Lives { found: u8, max: u8 },
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("unknown game mode: {0}")]
    UnknownMode(String),
}

/// Failure reading or writing persisted data
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage rejected the write: {0}")]
    Rejected(String),
}
