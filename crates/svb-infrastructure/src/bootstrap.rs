//! Manager bootstrap
//!
//! Wires service managers from loaded configuration: the shared registry,
//! per-manager binding overrides, the logging listener and the event bus.

use crate::config::{AppConfig, ConfigLoader};
use crate::infrastructure::events::ManagerEventBus;
use crate::logging::LoggingListener;
use std::sync::Arc;
use svb_application::lifecycle::ServiceManager;
use svb_application::ports::lifecycle::ServiceLifecycle;
use svb_application::ports::registry::ServiceRegistry;
use svb_domain::error::Result;
use tracing::info;

/// Builds managers that share one registry, configuration and event bus
#[derive(Clone)]
pub struct ManagerBootstrap {
    config: Arc<AppConfig>,
    registry: Arc<dyn ServiceRegistry>,
    events: ManagerEventBus,
}

impl ManagerBootstrap {
    /// Bootstrap over an already loaded configuration
    pub fn new(config: AppConfig, registry: Arc<dyn ServiceRegistry>) -> Self {
        let events = ManagerEventBus::from_config(&config.events);
        Self {
            config: Arc::new(config),
            registry,
            events,
        }
    }

    /// Load configuration with `loader` and bootstrap over it
    pub fn load(loader: &ConfigLoader, registry: Arc<dyn ServiceRegistry>) -> Result<Self> {
        Ok(Self::new(loader.load()?, registry))
    }

    /// Loaded configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared registry
    pub fn registry(&self) -> &Arc<dyn ServiceRegistry> {
        &self.registry
    }

    /// Bus receiving every built manager's events
    pub fn events(&self) -> &ManagerEventBus {
        &self.events
    }

    /// Build a manager named `name`, applying its configured overrides
    pub fn build<L: ServiceLifecycle>(
        &self,
        name: &str,
        lifecycle: L,
    ) -> Result<ServiceManager<L>> {
        let overrides = self
            .config
            .manager(name)
            .map(|m| m.bindings.clone())
            .unwrap_or_default();
        let override_count = overrides.len();

        let manager = ServiceManager::builder(name, lifecycle)
            .registry(Arc::clone(&self.registry))
            .binding_overrides(overrides)
            .listener(Arc::new(LoggingListener))
            .listener(Arc::new(self.events.clone()))
            .build()?;

        info!(manager = %name, overrides = override_count, "Service manager built");
        Ok(manager)
    }

    /// Build and start a manager
    pub fn start<L: ServiceLifecycle>(
        &self,
        name: &str,
        lifecycle: L,
    ) -> Result<ServiceManager<L>> {
        let manager = self.build(name, lifecycle)?;
        manager.start()?;
        Ok(manager)
    }
}

impl std::fmt::Debug for ManagerBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerBootstrap")
            .field("managers", &self.config.managers.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
