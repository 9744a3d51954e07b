//! Error types for starnote-core

use thiserror::Error;

/// Result type alias using starnote-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in starnote-core store operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Preference store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Username already registered (case-insensitive)
    #[error("Username is already taken: {0}")]
    DuplicateUsername(String),

    /// Email already registered (case-insensitive)
    #[error("Email is already registered: {0}")]
    DuplicateEmail(String),

    /// Username/password mismatch
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Name is not one of the 88 constellations
    #[error("Unknown constellation: {0}")]
    UnknownConstellation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
