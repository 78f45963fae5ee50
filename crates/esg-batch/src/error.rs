//! Error types for the batch harness

use std::path::PathBuf;
use thiserror::Error;

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, BatchError>;

#[derive(Error, Debug)]
pub enum BatchError {
    /// The analysis program could not be started or awaited
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Case file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Case file is not a JSON array of cases
    #[error("Invalid case file: {0}")]
    InvalidCases(#[from] serde_json::Error),

    /// Case file parsed but holds no cases
    #[error("No cases in {}", .0.display())]
    NoCases(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BatchError::NoCases(PathBuf::from("cases.json"));
        assert_eq!(err.to_string(), "No cases in cases.json");

        let err = BatchError::Spawn {
            command: "esg-detector".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to run esg-detector: not found");
    }
}
