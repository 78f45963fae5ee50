//! Error types for esg-core

use thiserror::Error;

/// Result type alias for esg-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// An LLM call failed after all providers were tried
    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    /// An evidence source failed
    #[error("Source error: {0}")]
    SourceFailed(String),

    /// The LLM replied with something that could not be interpreted
    #[error("Unparseable response: {0}")]
    UnparseableResponse(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
