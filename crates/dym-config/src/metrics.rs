//! Tool Configuration (dym.toml)
//!
//! Controls where the report is written and how it is rendered.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the report when nothing else is configured
pub const DEFAULT_OUTPUT_FILE: &str = "dynamic-metrics.json";

/// Tool configuration from dym.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Report file placement and formatting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,

    /// Report content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report file name (default: "dynamic-metrics.json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Directory for the report, relative to the working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Pretty-print the JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

/// Report content configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Embed the full program text in the sources table (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_source_text: Option<bool>,
}

impl MetricsConfig {
    /// Load tool configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    /// Parse tool configuration; `origin` is only used in error messages
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: origin.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the tool configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(name) = self.output.as_ref().and_then(|o| o.file_name.as_deref()) {
            validate_file_name(name)?;
        }

        if let Some(dir) = self.output.as_ref().and_then(|o| o.directory.as_deref()) {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "output.directory".to_string(),
                    reason: "directory cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Effective report file name
    pub fn output_file_name(&self) -> &str {
        self.output
            .as_ref()
            .and_then(|o| o.file_name.as_deref())
            .unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    /// Directory override, if any
    pub fn output_directory(&self) -> Option<&Path> {
        self.output.as_ref().and_then(|o| o.directory.as_deref())
    }

    /// Whether the document is pretty-printed
    pub fn pretty(&self) -> bool {
        self.output.as_ref().and_then(|o| o.pretty).unwrap_or(false)
    }

    /// Whether source text is embedded in the sources table
    pub fn include_source_text(&self) -> bool {
        self.report
            .as_ref()
            .and_then(|r| r.include_source_text)
            .unwrap_or(true)
    }

    /// Resolve the report path against a working directory
    pub fn output_path(&self, cwd: &Path) -> PathBuf {
        let dir = match self.output_directory() {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        dir.join(self.output_file_name())
    }

    /// Merge another config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &MetricsConfig) {
        if let Some(other_out) = &other.output {
            let out = self.output.get_or_insert_with(OutputConfig::default);
            if other_out.file_name.is_some() {
                out.file_name = other_out.file_name.clone();
            }
            if other_out.directory.is_some() {
                out.directory = other_out.directory.clone();
            }
            if other_out.pretty.is_some() {
                out.pretty = other_out.pretty;
            }
        }
        if let Some(other_report) = &other.report {
            let report = self.report.get_or_insert_with(ReportConfig::default);
            if other_report.include_source_text.is_some() {
                report.include_source_text = other_report.include_source_text;
            }
        }
    }
}

/// The report name must be a bare file name so the output stays next to `directory`
fn validate_file_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "output.file_name".to_string(),
            reason: "file name cannot be empty".to_string(),
        });
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConfigError::InvalidValue {
            field: "output.file_name".to_string(),
            reason: format!("'{}' is not a plain file name", name),
        });
    }
    Ok(())
}
