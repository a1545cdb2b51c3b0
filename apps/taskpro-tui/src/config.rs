//! Configuration for the TaskPro dashboard
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - Configuration file (`taskpro.toml`, or `TASKPRO_CONFIG_FILE`)
//! - Environment variables with the `TASKPRO__` prefix, e.g. `TASKPRO__API__BASE_URL`
//! - `TASKPRO_API_BASE_URL`

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskpro_session::DEFAULT_STORAGE_KEY;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the task API (default: http://localhost:8080/api)
    pub base_url: String,
}

/// Where the persisted session lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or full filter directive (default: info)
    pub level: String,
    /// Log file; defaults to `taskpro.log` in the storage directory
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_storage_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskpro")
}

impl Config {
    /// Load configuration from the given file (or the default location) and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_path = match config_file {
            Some(path) => path.to_path_buf(),
            None => std::env::var("TASKPRO_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("taskpro.toml")),
        };

        if config_path.exists() {
            info!("Loading configuration from {}", config_path.display());
            builder = builder.add_source(File::from(config_path.as_path()));
        } else {
            debug!(
                "No config file found at {}, using defaults",
                config_path.display()
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("TASKPRO")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Config = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("TASKPRO_API_BASE_URL") {
            info!("Using TASKPRO_API_BASE_URL environment variable");
            self.api.base_url = base_url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            anyhow::bail!("API base URL cannot be empty");
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!(
                "API base URL '{}' must start with http:// or https://",
                base_url
            );
        }

        if self.storage.key.trim().is_empty() {
            anyhow::bail!("Storage key cannot be empty");
        }

        if !self.is_filter_directive() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            let level = self.logging.level.to_lowercase();
            if !valid_levels.contains(&level.as_str()) {
                anyhow::bail!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level,
                    valid_levels
                );
            }
        }

        Ok(())
    }

    fn is_filter_directive(&self) -> bool {
        self.logging.level.contains('=') || self.logging.level.contains(',')
    }

    /// Filter string for `tracing_subscriber::EnvFilter`.
    pub fn log_filter(&self) -> String {
        if self.is_filter_directive() {
            return self.logging.level.clone();
        }
        let level = &self.logging.level;
        format!(
            "taskpro_tui={level},taskpro_api_client={level},taskpro_session={level},taskpro_tasks={level},warn"
        )
    }

    pub fn log_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| self.storage.dir.join("taskpro.log"))
    }
}
