//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::metrics::{MetricsConfig, OutputConfig, ReportConfig};
use crate::{ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Tool config (./dym.toml) - overrides defaults
/// 3. Environment variables (DYM_*) - overrides the file
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective tool configuration
    pub metrics: MetricsConfig,

    /// Path of the dym.toml that was loaded, if any
    pub config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find dym.toml, then applies
    /// environment overrides.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (config_file, metrics) = self.find_config(start_dir)?;
        let metrics = self.apply_env_overrides(metrics)?;

        Ok(Config {
            metrics,
            config_file,
        })
    }

    /// Load configuration from a specific dym.toml
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let metrics = MetricsConfig::load_from_file(config_path)?;
        let metrics = self.apply_env_overrides(metrics)?;

        Ok(Config {
            metrics,
            config_file: Some(config_path.to_path_buf()),
        })
    }

    /// Find tool configuration by walking up the directory tree
    fn find_config(&self, start_dir: &Path) -> ConfigResult<(Option<PathBuf>, MetricsConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let config = MetricsConfig::load_from_file(&config_path)?;
                return Ok((Some(config_path), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, MetricsConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Recognised variables: DYM_OUTPUT_FILE, DYM_OUTPUT_DIR, DYM_PRETTY,
    /// DYM_INCLUDE_SOURCE_TEXT
    fn apply_env_overrides(&self, mut config: MetricsConfig) -> ConfigResult<MetricsConfig> {
        let mut overrides = MetricsConfig::default();

        if let Ok(file_name) = env::var("DYM_OUTPUT_FILE") {
            overrides
                .output
                .get_or_insert_with(OutputConfig::default)
                .file_name = Some(file_name);
        }

        if let Ok(dir) = env::var("DYM_OUTPUT_DIR") {
            overrides
                .output
                .get_or_insert_with(OutputConfig::default)
                .directory = Some(PathBuf::from(dir));
        }

        if let Ok(pretty) = env::var("DYM_PRETTY") {
            overrides.output.get_or_insert_with(OutputConfig::default).pretty =
                Some(parse_bool(&pretty));
        }

        if let Ok(include) = env::var("DYM_INCLUDE_SOURCE_TEXT") {
            overrides
                .report
                .get_or_insert_with(ReportConfig::default)
                .include_source_text = Some(parse_bool(&include));
        }

        overrides.validate()?;
        config.merge(&overrides);
        Ok(config)
    }
}

impl Config {
    /// Check if a dym.toml was found
    pub fn has_config_file(&self) -> bool {
        self.config_file.is_some()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    #[serial]
    fn test_load_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_config_file(temp_dir.path(), "[output]\npretty = true\n");

        let config = ConfigLoader::new()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert!(config.metrics.pretty());
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[output]\nfile_name = \"parent.json\"\n");

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let config = ConfigLoader::new().load_from_directory(&sub_dir).unwrap();

        assert_eq!(config.metrics.output_file_name(), "parent.json");
        assert!(config.has_config_file());
    }

    #[test]
    #[serial]
    fn test_env_override_pretty() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[output]\npretty = false\n");

        env::set_var("DYM_PRETTY", "yes");
        let config = ConfigLoader::new()
            .load_from_directory(temp_dir.path())
            .unwrap();
        env::remove_var("DYM_PRETTY");

        assert!(config.metrics.pretty());
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_bad_file_name() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("DYM_OUTPUT_FILE", "nested/out.json");
        let result = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var("DYM_OUTPUT_FILE");

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
    }
}
