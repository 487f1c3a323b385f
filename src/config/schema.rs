//! Configuration schema definitions.
//!
//! Every field has a default so a minimal (or absent) config file yields a
//! working engine serving `app/` on port 8080.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PagetreeConfig {
    /// HTTP server settings (bind address, timeouts, body limit).
    pub server: ServerConfig,

    /// Application tree settings (root directory, handler file name).
    pub app: AppConfig,

    /// Dev-mode reloading.
    pub dev: DevConfig,

    /// Metrics exporter settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1_048_576,
        }
    }
}

/// Application tree settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory of the route tree.
    pub root: PathBuf,

    /// Handler file name looked for in each route directory.
    pub route_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("app"),
            route_file: "route.rhai".to_string(),
        }
    }
}

/// Dev-mode reloading settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    /// Whether the filesystem watcher rebuilds the table on changes.
    pub enabled: bool,

    /// Quiet window after a change before rebuilding, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: 200,
        }
    }
}

/// Metrics exporter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Address the Prometheus exporter binds (must be a socket address).
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = PagetreeConfig::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.app.root, PathBuf::from("app"));
        assert_eq!(config.app.route_file, "route.rhai");
        assert!(!config.dev.enabled);
        assert_eq!(config.dev.debounce_ms, 200);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PagetreeConfig = toml::from_str(
            r#"
            [app]
            root = "demo/app"

            [dev]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.app.root, PathBuf::from("demo/app"));
        assert_eq!(config.app.route_file, "route.rhai");
        assert!(config.dev.enabled);
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: PagetreeConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.max_body_bytes, 1_048_576);
        assert!(!config.observability.metrics_enabled);
    }
}
