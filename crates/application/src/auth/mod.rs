//! Authentication for outgoing calls.
//!
//! This module provides:
//! - The credential store every dispatch reads from
//! - The request interceptor that attaches bearer and tenant headers
//! - The single-flight refresh coordinator for expired tokens

mod credential_store;
mod interceptor;
mod refresh;

pub use credential_store::CredentialStore;
pub use interceptor::RequestInterceptor;
pub use refresh::{RefreshCoordinator, RefreshOutcome};
