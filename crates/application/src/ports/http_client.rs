//! HTTP transport port

use async_trait::async_trait;
use thiserror::Error;

use lyceum_domain::{RequestSpec, ResponseSpec};

/// Failures where no HTTP response reached the client.
///
/// Any status code, 4xx and 5xx included, is a response and is returned
/// as `Ok(ResponseSpec)`; these variants cover everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve host {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason (TLS, reset, ...).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was hit.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The URL could not be built or parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Anything else the transport reports.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// Implementations send exactly what they are given: header injection,
/// refresh and replay all happen above this trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever response came back.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError>;
}
