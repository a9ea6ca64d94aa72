//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and merging of the shipped defaults with
//! environment and operator override files.

use super::WorkerConfig;
use crate::error::{Result, WorkerError};
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Base configuration file name
const BASE_CONFIG_FILE: &str = "worker.yaml";

/// Operator override file, merged last (the published-config analog)
const LOCAL_CONFIG_FILE: &str = "worker.local.yaml";

/// Loaded, validated configuration plus the context it was loaded from
pub struct ConfigManager {
    config: WorkerConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with an explicit environment.
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> Result<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading worker configuration"
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        debug!(
            connection = %config.worker.connection,
            queue = %config.worker.queue,
            handler_mappings = config.handlers.len(),
            "Worker configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Environment the configuration was loaded for
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Directory the configuration was loaded from
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect environment from process environment variables
    pub fn detect_environment() -> String {
        env::var("SNSQ_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    /// Merge order: shipped base, then environment overrides, then the
    /// operator's local override file. Later files win key-by-key.
    fn load_and_merge_config(config_dir: &Path, environment: &str) -> Result<WorkerConfig> {
        let base_path = config_dir.join(BASE_CONFIG_FILE);
        let mut merged = Self::read_yaml_file(&base_path)?.ok_or_else(|| {
            WorkerError::configuration(
                "loader",
                format!("base configuration file not found: {}", base_path.display()),
            )
        })?;

        let env_path = config_dir.join(format!("worker.{environment}.yaml"));
        if let Some(overlay) = Self::read_yaml_file(&env_path)? {
            debug!(path = %env_path.display(), "Applying environment overrides");
            merged = Self::merge_values(merged, overlay);
        }

        let local_path = config_dir.join(LOCAL_CONFIG_FILE);
        if let Some(overlay) = Self::read_yaml_file(&local_path)? {
            debug!(path = %local_path.display(), "Applying operator overrides");
            merged = Self::merge_values(merged, overlay);
        }

        serde_yaml::from_value(merged)
            .map_err(|e| WorkerError::configuration("loader", e.to_string()))
    }

    /// Read a YAML file if it exists, refusing directories and special files
    fn read_yaml_file(path: &Path) -> Result<Option<YamlValue>> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(None),
        };

        if !metadata.is_file() {
            return Err(WorkerError::configuration(
                "loader",
                format!("configuration path is not a regular file: {}", path.display()),
            ));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            WorkerError::configuration("loader", format!("failed to read {}: {e}", path.display()))
        })?;

        let value = serde_yaml::from_str(&contents).map_err(|e| {
            WorkerError::configuration("loader", format!("failed to parse {}: {e}", path.display()))
        })?;

        Ok(Some(value))
    }

    /// Deep-merge two YAML values; overlay mappings merge key-wise, anything
    /// else replaces wholesale.
    fn merge_values(base: YamlValue, overlay: YamlValue) -> YamlValue {
        match (base, overlay) {
            (YamlValue::Mapping(mut base_map), YamlValue::Mapping(overlay_map)) => {
                for (key, overlay_value) in overlay_map {
                    let merged_value = match base_map.remove(&key) {
                        Some(base_value) => Self::merge_values(base_value, overlay_value),
                        None => overlay_value,
                    };
                    base_map.insert(key, merged_value);
                }
                YamlValue::Mapping(base_map)
            }
            (_, overlay) => overlay,
        }
    }
}
