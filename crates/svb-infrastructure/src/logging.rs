//! Structured logging with tracing
//!
//! Provides centralized logging configuration and utilities using the tracing ecosystem.
//! This module configures structured logging with JSON output, log levels, and file rotation.

use crate::constants::{LOG_DEFAULT_FILE_STEM, LOG_FILTER_ENV};
use std::ffi::OsStr;
use std::path::Path;
use svb_domain::error::{Error, Result};
use svb_domain::events::ManagerEvent;
use svb_domain::ports::Listener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Re-export LoggingConfig for convenience
pub use crate::config::LoggingConfig;

/// Initialize logging with the provided configuration
///
/// `SVB_LOG` overrides the configured level with a full `EnvFilter`
/// directive. Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| OsStr::new(LOG_DEFAULT_FILE_STEM)),
        )
    });

    // Layer types differ between plain and JSON output, so each gets its own branch
    let installed = if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    } else {
        let stdout = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    };
    installed.map_err(|e| Error::Configuration {
        message: format!("Failed to install tracing subscriber: {e}"),
        source: None,
    })?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::Configuration {
            message: format!("Invalid log level: {level}. Use trace, debug, info, warn, or error"),
            source: None,
        }),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}

/// Writes every manager event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl Listener<ManagerEvent> for LoggingListener {
    fn on_event(&self, event: &ManagerEvent) {
        match event {
            ManagerEvent::StateChanged {
                manager,
                state,
                previous,
            } => info!(manager = %manager, from = %previous, to = %state, "Manager state changed"),
            ManagerEvent::ServiceReplaced { manager, slot } => {
                info!(manager = %manager, slot = %slot, "Service replaced");
            }
            ManagerEvent::CreationFailed { manager, message } => {
                error!(manager = %manager, error = %message, "Service creation failed");
            }
            ManagerEvent::UpdateFailed {
                manager,
                slot,
                message,
            } => error!(
                manager = %manager,
                slot = %slot,
                error = %message,
                "Dependency update failed"
            ),
            ManagerEvent::DisposalFailed { manager, message } => {
                error!(manager = %manager, error = %message, "Service disposal failed");
            }
        }
    }
}
