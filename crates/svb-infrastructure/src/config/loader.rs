//! Configuration loader
//!
//! Handles loading configuration from various sources including
//! TOML files, environment variables, and default values.

use crate::config::AppConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::{ErrorContext, infra};
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};
use svb_domain::error::Result;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first discovered `svb.toml`)
    /// 3. Environment variables with prefix (e.g., `SVB__LOGGING__LEVEL`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        // Double underscore separates nested keys so single underscores stay
        // inside field names (SVB__LOGGING__JSON_FORMAT)
        let prefix = format!("{}{}", self.env_prefix, CONFIG_ENV_SEPARATOR);
        figment = figment.merge(Env::prefixed(&prefix).split(CONFIG_ENV_SEPARATOR));

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context(format!(
            "Failed to write config file {}",
            path.as_ref().display()
        ))?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::home_dir().map(|d| {
                d.join(format!(".{DEFAULT_CONFIG_DIR}"))
                    .join(DEFAULT_CONFIG_FILENAME)
            }),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Binding-override filters are already parsed during extraction.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;

    if config.events.capacity == 0 {
        return Err(infra::config_error(
            "events.capacity",
            "event bus capacity cannot be 0",
        ));
    }

    for (name, manager) in &config.managers {
        if name.trim().is_empty() {
            return Err(infra::config_error("managers", "manager name cannot be empty"));
        }
        if let Some(slot) = manager.bindings.keys().find(|slot| slot.trim().is_empty()) {
            return Err(infra::config_error(
                &format!("managers.{name}.bindings"),
                format!("slot name '{slot}' cannot be empty"),
            ));
        }
    }
    Ok(())
}
