//! Dynamic Metrics Configuration
//!
//! Provides configuration for the dynamic metrics tool:
//! - Tool configuration (dym.toml)
//! - Environment variable overrides (DYM_*)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults (`<cwd>/dynamic-metrics.json`, single-line JSON)
//! 2. Tool config (./dym.toml, found by walking up from the start directory)
//! 3. Environment variables (DYM_*)
//!
//! # Example
//!
//! ```no_run
//! use dym_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{}", config.metrics.output_file_name());
//! ```

pub mod loader;
pub mod metrics;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the configuration file looked up by the loader
pub const CONFIG_FILE_NAME: &str = "dym.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader};
pub use metrics::{MetricsConfig, OutputConfig, ReportConfig, DEFAULT_OUTPUT_FILE};
