//! Application error types

use thiserror::Error;

use lyceum_domain::{
    DomainError, ResponseSpec, SESSION_EXPIRED_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE,
    error_message,
};

use crate::ports::HttpClientError;

/// Why a token refresh did not produce a new access token.
///
/// Cloneable because one refresh outcome is handed to every call that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The refresh call never got a response.
    #[error("refresh request failed: {0}")]
    Transport(#[from] HttpClientError),

    /// The refresh endpoint answered with a non-2xx status.
    #[error("refresh rejected with status {status}: {message}")]
    Rejected {
        /// Status returned by the refresh endpoint.
        status: u16,
        /// Classified message from the response body.
        message: String,
    },

    /// The refresh endpoint answered 2xx without a token.
    #[error("refresh response has no `{0}` field")]
    MissingToken(String),
}

/// Final outcome of a failed call through the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request was rejected before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// No response was received.
    #[error("{message}")]
    Transport {
        /// What the transport reported.
        #[source]
        source: HttpClientError,
        /// Message shown to the user.
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message shown to the user.
        message: String,
        /// The full response, for callers that need the body.
        response: Box<ResponseSpec>,
    },

    /// The access token expired and could not be refreshed.
    #[error("session could not be refreshed: {source}")]
    RefreshFailed {
        /// Why the refresh failed.
        #[source]
        source: RefreshError,
    },

    /// A 2xx body did not have the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Builds the error for a call that never got a response.
    #[must_use]
    pub fn transport(source: HttpClientError) -> Self {
        Self::Transport {
            source,
            message: error_message(None, None),
        }
    }

    /// Builds the error for a non-2xx response, classifying its body.
    #[must_use]
    pub fn status(response: ResponseSpec) -> Self {
        let message = error_message(Some(response.status), response.payload().as_ref());
        Self::Status {
            status: response.status,
            message,
            response: Box::new(response),
        }
    }

    /// Builds the error for a 401 that ends the session.
    #[must_use]
    pub fn session_expired(response: ResponseSpec) -> Self {
        Self::Status {
            status: response.status,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            response: Box::new(response),
        }
    }

    /// Returns the HTTP status when the failure was a response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the single string to show the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { message, .. } | Self::Status { message, .. } => message.clone(),
            Self::RefreshFailed { .. } => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::InvalidRequest(e) => e.to_string(),
            Self::Decode(_) => UNEXPECTED_RESPONSE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_domain::NETWORK_ERROR_MESSAGE;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_transport_error_message() {
        let err = GatewayError::transport(HttpClientError::ConnectionRefused {
            host: "localhost".to_string(),
            port: 8000,
        });
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_status_error_classifies_body() {
        let err = GatewayError::status(ResponseSpec::json(
            400,
            &json!({ "detail": "Section is full" }),
        ));
        assert_eq!(err.user_message(), "Section is full");
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.to_string(), "Section is full");
    }

    #[test]
    fn test_refresh_failure_reads_as_session_expired() {
        let err = GatewayError::RefreshFailed {
            source: RefreshError::MissingToken("access_token".to_string()),
        };
        assert_eq!(err.user_message(), SESSION_EXPIRED_MESSAGE);
    }
}
