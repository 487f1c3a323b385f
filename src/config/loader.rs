//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PagetreeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that forces dev mode on or off.
pub const DEV_ENV_VAR: &str = "PAGETREE_DEV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Loads and validates a TOML configuration file.
pub fn load_config(path: &Path) -> Result<PagetreeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: PagetreeConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Applies environment overrides on top of a loaded (or default) config.
///
/// `PAGETREE_DEV=1` (or `true`) switches dev mode on without touching the
/// config file; `0`/`false` switches it off.
pub fn apply_env_overrides(config: &mut PagetreeConfig) {
    if let Ok(value) = std::env::var(DEV_ENV_VAR) {
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" => config.dev.enabled = true,
            "0" | "false" => config.dev.enabled = false,
            other => {
                tracing::warn!(value = %other, "Ignoring unrecognized {DEV_ENV_VAR} value");
            }
        }
    }
}
