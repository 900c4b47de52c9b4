//! Error types for booktrack-core

use thiserror::Error;

/// Main error type for the booktrack-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required field is missing or a value is out of range
    #[error("validation error: {0}")]
    Validation(String),

    /// Timer transition invoked from a state that does not permit it
    #[error("invalid timer transition: {op}() while {state}")]
    InvalidState {
        op: &'static str,
        state: &'static str,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for booktrack-core
pub type Result<T> = std::result::Result<T, Error>;
