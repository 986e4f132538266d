//! # Service Binding
//!
//! Tracks a dynamic set of dependencies published in a service registry and
//! decides when a dependent service may be created, reconfigured or disposed.
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use svb::{
//!     DependencyMap, DependencySpec, InMemoryRegistry, PlayState, Result, ServiceLifecycle,
//!     ServiceManager,
//! };
//!
//! struct Database;
//! struct Billing {
//!     db: Arc<Database>,
//! }
//!
//! struct BillingLifecycle;
//!
//! impl ServiceLifecycle for BillingLifecycle {
//!     type Service = Billing;
//!
//!     fn dependencies(&self) -> Vec<DependencySpec> {
//!         vec![DependencySpec::mandatory("db", "svc.Database")]
//!     }
//!
//!     fn create(&self, dependencies: &DependencyMap) -> Result<Billing> {
//!         Ok(Billing {
//!             db: dependencies.require::<Database>("db")?,
//!         })
//!     }
//! }
//!
//! let registry = InMemoryRegistry::new_shared();
//! let manager = ServiceManager::builder("billing", BillingLifecycle)
//!     .registry(registry.clone())
//!     .build()?;
//! manager.start()?;
//! assert_eq!(manager.play_state(), PlayState::Pending);
//!
//! registry.register(&["svc.Database"], BTreeMap::new(), Arc::new(Database))?;
//! assert_eq!(manager.play_state(), PlayState::Running);
//! # Ok::<(), svb::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - `domain` - references, filters, binding declarations, errors and events
//! - `application` - lifecycle and registry ports, trackers, the service manager
//! - `infrastructure` - configuration, logging, in-memory registry, event bus

/// Domain layer - value objects, errors and events
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use svb_domain::*;
}

/// Application layer - ports, dependency trackers and the service manager
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use svb_application::*;
}

/// Infrastructure layer - config, logging, registry and event bus
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use svb_infrastructure::*;
}

// Re-export commonly used types at the crate root
pub use domain::{
    BindingOverride, BindingSpec, BindingStrategy, Cardinality, DependencySpec, Error, Filter,
    ManagerEvent, PlayState, Reference, ReferenceId, RegistryEventKind, Result, ServiceDescriptor,
    UpdateStrategy,
};

pub use application::{
    ChangeOutcome, DependencyChange, DependencyMap, DependencyValue, InstanceResolver,
    RegistryListener, RegistryNotification, ServiceInstance, ServiceLifecycle, ServiceManager,
    ServiceManagerBuilder, ServiceRegistry, TrackedValue, TransitionKind,
};

pub use infrastructure::{
    AppConfig, ConfigLoader, InMemoryRegistry, ManagerBootstrap, ManagerEventBus, init_logging,
};
