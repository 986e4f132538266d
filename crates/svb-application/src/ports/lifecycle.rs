//! Service Lifecycle Port
//!
//! The lifecycle collaborator declares a consumer's dependency slots and
//! knows how to build, reconfigure and tear down the consumer's service from a
//! fully populated [`DependencyMap`]. The manager never calls it concurrently
//! for the same service instance.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use svb_application::ports::lifecycle::{DependencyMap, ServiceLifecycle};
//! use svb_domain::{DependencySpec, Result};
//!
//! struct Database;
//! struct Billing { db: Arc<Database> }
//!
//! struct BillingLifecycle;
//!
//! impl ServiceLifecycle for BillingLifecycle {
//!     type Service = Billing;
//!
//!     fn dependencies(&self) -> Vec<DependencySpec> {
//!         vec![DependencySpec::mandatory("db", "com.acme.Database")]
//!     }
//!
//!     fn create(&self, deps: &DependencyMap) -> Result<Billing> {
//!         Ok(Billing { db: deps.require::<Database>("db")? })
//!     }
//! }
//! ```

use crate::tracking::{TrackedValue, TransitionKind};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use svb_domain::error::{Error, Result};
use svb_domain::value_objects::DependencySpec;

/// Type-erased service instance supplied by the registry
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

/// Resolved value of one slot
#[derive(Clone)]
pub enum DependencyValue {
    /// Unary slot
    Single(ServiceInstance),
    /// Multiple slot, in the slot's binding order
    Multiple(Vec<ServiceInstance>),
}

impl DependencyValue {
    /// Downcast a unary value (or the first element of a list)
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let instance = match self {
            Self::Single(instance) => instance,
            Self::Multiple(instances) => instances.first()?,
        };
        Arc::clone(instance).downcast::<T>().ok()
    }

    /// Downcast every element, skipping those of another type
    pub fn downcast_all<T: Any + Send + Sync>(&self) -> Vec<Arc<T>> {
        let instances: &[ServiceInstance] = match self {
            Self::Single(instance) => std::slice::from_ref(instance),
            Self::Multiple(instances) => instances,
        };
        instances
            .iter()
            .filter_map(|i| Arc::clone(i).downcast::<T>().ok())
            .collect()
    }

    /// Number of instances carried
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(instances) => instances.len(),
        }
    }

    /// Whether no instance is carried
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DependencyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Single(..)"),
            Self::Multiple(instances) => write!(f, "Multiple({} instances)", instances.len()),
        }
    }
}

/// Slot name to resolved value, covering every declared slot
///
/// Optional slots with nothing bound are present with a `None` value.
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    values: HashMap<String, Option<DependencyValue>>,
}

impl DependencyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value of a slot
    pub fn insert(&mut self, slot: impl Into<String>, value: Option<DependencyValue>) {
        self.values.insert(slot.into(), value);
    }

    /// Value of a slot; `None` if unbound or undeclared
    pub fn get(&self, slot: &str) -> Option<&DependencyValue> {
        self.values.get(slot).and_then(Option::as_ref)
    }

    /// Whether the slot is declared in the map
    pub fn contains_slot(&self, slot: &str) -> bool {
        self.values.contains_key(slot)
    }

    /// Typed unary value of a slot
    pub fn single<T: Any + Send + Sync>(&self, slot: &str) -> Option<Arc<T>> {
        self.get(slot).and_then(DependencyValue::downcast)
    }

    /// Typed values of a multiple slot, empty when unbound
    pub fn multiple<T: Any + Send + Sync>(&self, slot: &str) -> Vec<Arc<T>> {
        self.get(slot)
            .map(DependencyValue::downcast_all)
            .unwrap_or_default()
    }

    /// Typed unary value of a slot, failing when absent or of another type
    pub fn require<T: Any + Send + Sync>(&self, slot: &str) -> Result<Arc<T>> {
        self.single(slot)
            .ok_or_else(|| Error::not_found(format!("dependency '{slot}'")))
    }

    /// Declared slot names
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of declared slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no slot is declared
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One slot change delivered to a live service
#[derive(Debug)]
pub struct DependencyChange<'a> {
    /// Kind of transition
    pub kind: TransitionKind,
    /// Slot that changed
    pub slot: &'a str,
    /// References bound before the change
    pub previous: Option<&'a TrackedValue>,
    /// References bound after the change
    pub current: Option<&'a TrackedValue>,
    /// Resolved value after the change
    pub new_value: Option<&'a DependencyValue>,
    /// Full dependency map after the change
    pub dependencies: &'a DependencyMap,
}

/// What the manager should do after a dependency change
#[derive(Debug)]
pub enum ChangeOutcome<S> {
    /// Keep the current instance
    Unchanged,
    /// Swap the live instance for this one
    Replace(S),
    /// Dispose the current instance
    Dispose,
}

/// Collaborator that builds and tears down the managed service
pub trait ServiceLifecycle: Send + Sync + 'static {
    /// Service produced by this lifecycle
    type Service: Send + Sync + 'static;

    /// Slots this lifecycle depends on
    fn dependencies(&self) -> Vec<DependencySpec>;

    /// Build the service from a map where every mandatory slot is bound
    fn create(&self, dependencies: &DependencyMap) -> Result<Self::Service>;

    /// React to a slot change while the service is live
    fn on_dependency_change(
        &self,
        _service: &Arc<Self::Service>,
        _change: &DependencyChange<'_>,
    ) -> Result<ChangeOutcome<Self::Service>> {
        Ok(ChangeOutcome::Unchanged)
    }

    /// Release the service
    fn dispose(&self, _service: Arc<Self::Service>, _dependencies: &DependencyMap) -> Result<()> {
        Ok(())
    }
}
