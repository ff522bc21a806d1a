//! Lyceum Application - Gateway orchestration and ports
//!
//! This crate holds everything between a caller asking for an HTTP call
//! and the transport that performs it:
//! - Port traits for the transport and session persistence
//! - The credential store and the request interceptor that reads it
//! - Single-flight access-token refresh with one replay per call
//! - The notification sink feeding the UI toast renderer
//! - The gateway that ties them together, and the session service on top

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod ports;
pub mod session;

pub use auth::{CredentialStore, RefreshCoordinator, RefreshOutcome, RequestInterceptor};
pub use config::{AUTHORIZATION_HEADER, GatewayConfig};
pub use error::{GatewayError, GatewayResult, RefreshError};
pub use gateway::ApiGateway;
pub use notify::{NotificationHandler, NotificationSink};
pub use ports::{HttpClientError, HttpTransport, SessionRepository, SessionStorageError};
pub use session::{SessionError, SessionService};

#[cfg(test)]
mod testing;
