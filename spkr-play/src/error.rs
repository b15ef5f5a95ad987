//! Error types for spkr-play
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for the spkr-play crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Clip payload decoding errors
    #[error("Clip decode error: {0}")]
    Decode(String),

    /// Media sink errors
    #[error("Media sink error: {0}")]
    Sink(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the spkr-play Error
pub type Result<T> = std::result::Result<T, Error>;
