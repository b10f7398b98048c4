//! Common error types for matchdeck

use thiserror::Error;

/// Common result type for matchdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the engine and its hosts
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML or JSON input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid caller-supplied data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
