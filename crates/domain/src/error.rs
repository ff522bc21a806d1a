//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is empty or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name is empty or contains characters HTTP does not allow.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
