//! Lyceum Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the ports defined in the application
//! layer, plus configuration loading.

pub mod adapters;
pub mod configuration;
pub mod persistence;

pub use adapters::ReqwestHttpClient;
pub use configuration::{ConfigError, ENV_PREFIX, load_config};
pub use persistence::FileSessionRepository;
