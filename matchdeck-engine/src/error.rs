//! Error types for matchdeck-engine
//!
//! Engine operations themselves never fail fatally: invalid operations are
//! reported as `None`/`false`. These errors cover the ambient surfaces
//! (configuration, input files, simulator scripts).

use thiserror::Error;

/// Main error type for the engine crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from the shared library
    #[error(transparent)]
    Common(#[from] matchdeck_common::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed simulator script line
    #[error("Script error at line {line}: {message}")]
    Script { line: usize, message: String },

    /// Collaborator construction failures (HTTP client setup)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Operation not possible in the engine's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;
