//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the gateway core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod http_client;
mod session_repository;

pub use http_client::{HttpClientError, HttpTransport};
pub use session_repository::{SessionRepository, SessionStorageError};
