//! # DataError
//!
//! Centralized error handling for the Matinee data layer.
//! Every operation returns the same tagged taxonomy so callers decide
//! between "fail loudly" and "fall back to another source" uniformly.

use thiserror::Error;

/// The primary error type for all data-layer operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Bad caller input (e.g., empty title). Never reaches the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// A point operation targeted an id the authoritative store doesn't have.
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Network-level failure: unreachable host, timeout, DNS.
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({code}): {message}")]
    Status { code: u16, message: String },

    /// The local cache refused a write while acting as the sole store.
    #[error("local cache error: {0}")]
    Cache(String),

    /// Malformed payload on either side of the wire.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DataError {
    /// True for failures that demote backend availability: the transport
    /// died or the backend rejected us. Validation and not-found answers
    /// are definitive and say nothing about reachability.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// A specialized Result type for Matinee data operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_resource_and_id() {
        let err = DataError::NotFound("post".into(), "abc123".into());
        assert_eq!(err.to_string(), "post not found with ID abc123");
    }

    #[test]
    fn remote_failures_are_classified() {
        assert!(DataError::Transport("connection refused".into()).is_remote_failure());
        assert!(DataError::Status { code: 500, message: "boom".into() }.is_remote_failure());
        assert!(!DataError::Validation("title is required".into()).is_remote_failure());
        assert!(!DataError::NotFound("post".into(), "x".into()).is_remote_failure());
    }
}
