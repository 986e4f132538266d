//! Collaborator Ports
//!
//! Boundary contracts the binding core consumes:
//!
//! - **lifecycle.rs** - creates, updates and disposes the managed service
//! - **registry.rs** - supplies change notifications and resolves instances

/// Lifecycle collaborator and dependency map
pub mod lifecycle;
/// Registry collaborator
pub mod registry;

pub use lifecycle::{
    ChangeOutcome, DependencyChange, DependencyMap, DependencyValue, ServiceInstance,
    ServiceLifecycle,
};
pub use registry::{
    InstanceResolver, RegistryListener, RegistryNotification, ServiceRegistry, WatchId,
};
