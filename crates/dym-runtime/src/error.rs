//! Error types for the metrics tool
//!
//! Only the reporting side can fail; probe hooks never return errors.

use dym_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while configuring the tool or writing the report
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to write report to {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl MetricsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MetricsError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for reporting operations
pub type MetricsResult<T> = Result<T, MetricsError>;
