//! Error type shared by the grid model, the variant arena and the network
//! document loader.
//!
//! Algorithm crates define their own error enums and wrap [`SweError`] where
//! a grid operation fails underneath them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors (duplicate ids, dangling references)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup or structural errors on the grid
    #[error("Network error: {0}")]
    Network(String),

    /// Variant arena errors (unknown id, removing the working variant)
    #[error("Variant error: {0}")]
    Variant(String),

    /// Linear solver errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type SweResult<T> = Result<T, SweError>;

impl From<anyhow::Error> for SweError {
    fn from(err: anyhow::Error) -> Self {
        SweError::Other(err.to_string())
    }
}

impl From<String> for SweError {
    fn from(s: String) -> Self {
        SweError::Other(s)
    }
}

impl From<&str> for SweError {
    fn from(s: &str) -> Self {
        SweError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for SweError {
    fn from(err: serde_json::Error) -> Self {
        SweError::Parse(err.to_string())
    }
}
