//! Error types for evidence sources

use thiserror::Error;

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while fetching evidence
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level failure
    #[error("{source_name} request failed: {detail}")]
    RequestFailed { source_name: String, detail: String },

    /// Non-success HTTP status
    #[error("{source_name} API error {status}: {body}")]
    ApiError {
        source_name: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to parse {source_name} response: {detail}")]
    ParseError { source_name: String, detail: String },

    /// Client built without credentials
    #[error("Missing API key for {0}")]
    MissingApiKey(String),
}

impl From<SourceError> for esg_core::Error {
    fn from(err: SourceError) -> Self {
        esg_core::Error::SourceFailed(err.to_string())
    }
}
