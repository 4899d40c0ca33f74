//! Store errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot prepare database directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration v{version} failed: {reason}")]
    Migration { version: u32, reason: String },

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Invalid database URI: '{0}'")]
    InvalidUri(String),

    /// A JSON column (roles, agenda) failed to encode or decode.
    #[error("Malformed stored document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Invalid stored timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// A record referenced inside a multi-step write does not exist.
    #[error("{0}")]
    NotFound(String),
}
