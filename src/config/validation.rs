//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, sane debounce)
//! - Catch file-name collisions between handler and template files
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: `PagetreeConfig → Result<(), Vec<ValidationError>>`
//! - Runs before a config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PagetreeConfig;
use crate::render::layout::{DOCUMENT_FILE, LAYOUT_FILE};
use crate::routing::table::PAGE_FILE;

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Checks a parsed configuration for semantic problems.
pub fn validate_config(config: &PagetreeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.is_empty() || !config.server.bind_address.contains(':') {
        errors.push(ValidationError::new(
            "server.bind_address",
            "must be a host:port address",
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be at least 1",
        ));
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "server.max_body_bytes",
            "must be at least 1",
        ));
    }

    if config.app.root.as_os_str().is_empty() {
        errors.push(ValidationError::new("app.root", "must not be empty"));
    }
    let route_file = &config.app.route_file;
    if route_file.is_empty() {
        errors.push(ValidationError::new("app.route_file", "must not be empty"));
    } else if route_file.contains('/') || route_file.contains('\\') {
        errors.push(ValidationError::new(
            "app.route_file",
            "must be a bare file name",
        ));
    } else if [PAGE_FILE, LAYOUT_FILE, DOCUMENT_FILE].contains(&route_file.as_str()) {
        errors.push(ValidationError::new(
            "app.route_file",
            format!("must not collide with the template file {route_file}"),
        ));
    }

    if config.dev.debounce_ms > 60_000 {
        errors.push(ValidationError::new(
            "dev.debounce_ms",
            "must be at most 60000",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address like 127.0.0.1:9090",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
