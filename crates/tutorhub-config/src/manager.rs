//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::AppConfig,
};

/// Default environment prefix
pub const ENV_PREFIX: &str = "TUTORHUB";

/// Loads, validates and saves [`AppConfig`]
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tutorhub")
            .join("config.toml")
    }

    /// Load file and environment layers, then validate
    pub fn load(&self) -> Result<AppConfig> {
        let builder = Config::builder()
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        self.validate(&app_config)?;

        debug!(path = ?self.config_path, base_url = %app_config.api.base_url, "Configuration loaded");
        Ok(app_config)
    }

    /// Write the configuration as TOML
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.validate(config)?;
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    /// Reject values the client cannot run with
    pub fn validate(&self, config: &AppConfig) -> Result<()> {
        let base = config.api.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Validation("api.base_url must be set".to_string()));
        }
        match url::Url::parse(base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "api.base_url must be an http(s) URL, got '{base}'"
                )))
            }
        }
        if config.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if config.lecture.route_namespace.trim().is_empty() {
            return Err(ConfigError::Validation(
                "lecture.route_namespace must be set".to_string(),
            ));
        }
        if config.lecture.status_poll_interval_secs == 0
            || config.lecture.heartbeat_interval_secs == 0
        {
            return Err(ConfigError::Validation(
                "lecture intervals must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
