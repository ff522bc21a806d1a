//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults (`GatewayConfig::default`)
//! 2. an optional config file (TOML, YAML or JSON, by extension)
//! 3. `LYCEUM_*` environment variables, e.g. `LYCEUM_BASE_URL`

use std::path::Path;

use config::{Config, Environment, File};
use lyceum_application::GatewayConfig;
use thiserror::Error;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "LYCEUM";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(String),

    /// A source could not be read or did not match the expected shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

/// Loads the gateway configuration.
///
/// `file` is required to exist when given. Without it only defaults and
/// environment variables apply.
///
/// # Errors
///
/// Returns an error if the file is missing or any source is malformed.
pub fn load_config(file: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_with_env(file, Environment::with_prefix(ENV_PREFIX).try_parsing(true))
}

fn load_with_env(file: Option<&Path>, env: Environment) -> Result<GatewayConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = file {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        builder = builder.add_source(File::from(path));
    }

    let config: GatewayConfig = builder.add_source(env).build()?.try_deserialize()?;

    tracing::debug!(base_url = %config.base_url, "configuration loaded");
    Ok(config)
}
