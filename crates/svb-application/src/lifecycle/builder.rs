//! Service manager construction

use super::manager::{ManagerCore, ManagerState, ServiceManager};
use crate::ports::lifecycle::ServiceLifecycle;
use crate::ports::registry::ServiceRegistry;
use crate::tracking::tracker_for;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use svb_domain::error::{Error, Result};
use svb_domain::events::ManagerEvent;
use svb_domain::ports::Listener;
use svb_domain::value_objects::{BindingOverride, BindingSpec};

/// Builder for [`ServiceManager`]
///
/// All configuration is passed in explicitly; there is no process-wide
/// default.
pub struct ServiceManagerBuilder<L: ServiceLifecycle> {
    name: String,
    lifecycle: L,
    registry: Option<Arc<dyn ServiceRegistry>>,
    overrides: HashMap<String, BindingOverride>,
    listeners: Vec<Arc<dyn Listener<ManagerEvent>>>,
}

impl<L: ServiceLifecycle> ServiceManagerBuilder<L> {
    pub(super) fn new(name: impl Into<String>, lifecycle: L) -> Self {
        Self {
            name: name.into(),
            lifecycle,
            registry: None,
            overrides: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Registry the manager watches once started
    ///
    /// Without a registry, notifications must be injected through
    /// [`ServiceManager::notify`].
    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn ServiceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adjust one slot's binding
    #[must_use]
    pub fn binding_override(mut self, slot: impl Into<String>, overrides: BindingOverride) -> Self {
        self.overrides.insert(slot.into(), overrides);
        self
    }

    /// Adjust several slots' bindings
    #[must_use]
    pub fn binding_overrides(mut self, overrides: HashMap<String, BindingOverride>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Listener receiving this manager's events from the start
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn Listener<ManagerEvent>>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Resolve bindings and create the trackers
    pub fn build(self) -> Result<ServiceManager<L>> {
        let specs = self.lifecycle.dependencies();

        let mut names = HashSet::new();
        for spec in &specs {
            if !names.insert(spec.name.clone()) {
                return Err(Error::DuplicateSlot {
                    name: spec.name.clone(),
                });
            }
        }
        if let Some(unknown) = self.overrides.keys().find(|slot| !names.contains(*slot)) {
            return Err(Error::unknown_slot(unknown.clone()));
        }

        let trackers = specs
            .into_iter()
            .map(|spec| {
                let overrides = self.overrides.get(&spec.name);
                BindingSpec::resolve(spec, overrides).map(tracker_for)
            })
            .collect::<Result<Vec<_>>>()?;

        let core = ManagerCore::new(
            self.name,
            self.lifecycle,
            self.registry,
            ManagerState::new(trackers),
        );
        for listener in self.listeners {
            core.listeners.add_listener(listener);
        }
        Ok(ServiceManager::from_core(Arc::new(core)))
    }
}
