//! Unified error type for the data layer

use thiserror::Error;

/// Data layer failure
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Migration failed
    #[error("migration to version {version} failed: {error}")]
    MigrationFailed { version: i32, error: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
