//! Error types for the joke skill Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a skill turn.
#[derive(Error, Debug)]
pub enum Error {
    /// Joke provider HTTP error
    #[error("Joke provider error: {0}")]
    Provider(#[from] reqwest::Error),

    /// Speech synthesis error
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Persistent storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content category id outside the known set
    #[error("Unknown content category: {0}")]
    UnknownCategory(String),

    /// Request envelope missing a required field
    #[error("Malformed request envelope: {0}")]
    Envelope(String),

    /// Audio object reference that cannot be mapped to a storage key
    #[error("Malformed audio location: {0}")]
    AudioLocation(String),
}
