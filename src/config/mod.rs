//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! pagetree.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → environment overrides (PAGETREE_DEV)
//!     → PagetreeConfig (validated, immutable)
//!     → shared via Arc with the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; dev mode reloads routes, not config
//! - All fields have defaults so the engine runs without any config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::PagetreeConfig;
