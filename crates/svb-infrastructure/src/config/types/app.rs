//! Main application configuration

use super::{EventBusConfig, LoggingConfig, ManagerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [events]
/// capacity = 256
///
/// [managers.billing.bindings.db]
/// update_strategy = "eager"
/// filter = "(region=eu)"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Manager event bus configuration
    pub events: EventBusConfig,

    /// Per-manager settings, keyed by manager name
    pub managers: HashMap<String, ManagerConfig>,
}

impl AppConfig {
    /// Settings of one manager, if configured
    pub fn manager(&self, name: &str) -> Option<&ManagerConfig> {
        self.managers.get(name)
    }
}
