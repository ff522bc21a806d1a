//! Lyceum Domain - Core gateway types
//!
//! This crate defines the data model shared by the Lyceum gateway:
//! outbound requests, responses, credentials, notifications and the
//! rules that turn a failed call into a message a person can read.
//! All types here are pure Rust with no I/O dependencies.

pub mod credential;
pub mod error;
pub mod message;
pub mod notification;
pub mod request;
pub mod response;

pub use credential::Credential;
pub use error::{DomainError, DomainResult};
pub use message::{
    NETWORK_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE, SUCCESS_FALLBACK_MESSAGE,
    UNEXPECTED_RESPONSE_MESSAGE, error_message, sanitize_message, success_message,
};
pub use notification::{Notification, Severity};
pub use request::{Header, Headers, HttpMethod, PendingRequest, RequestSpec};
pub use response::ResponseSpec;
