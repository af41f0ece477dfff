//! Error types for gptcall

use thiserror::Error;

/// Result type alias using gptcall's Error
pub type Result<T> = std::result::Result<T, Error>;

/// gptcall error types with helpful messages
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Api key is not set. Export OPENAI_API_KEY or run `gptcall config set-key`.")]
    ApiKeyMissing,

    #[error("Configuration error: {0}")]
    Config(String),

    // Validation errors (reported before any network I/O)
    #[error("{0}")]
    InvalidParameters(String),

    // Network errors
    #[error("Error sending request: {0}")]
    Transport(String),

    #[error("Api error")]
    Api,

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
