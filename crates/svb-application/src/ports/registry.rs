//! Registry Port
//!
//! The registry collaborator announces candidate instances for a descriptor
//! and resolves a [`Reference`] to its instance on demand. Any backend (an
//! in-process map, an etcd-style watch, a broker topic) can supply events as
//! long as it honors this contract.

use crate::ports::lifecycle::ServiceInstance;
use std::sync::Arc;
use svb_domain::error::Result;
use svb_domain::events::RegistryEventKind;
use svb_domain::value_objects::{Reference, ServiceDescriptor};

/// Resolves a reference to the instance behind it
///
/// Called lazily by the core; a `None` result means the instance is gone.
pub trait InstanceResolver: Send + Sync {
    /// Instance behind `reference`, if still available
    fn resolve(&self, reference: &Reference) -> Option<ServiceInstance>;
}

impl<F> InstanceResolver for F
where
    F: Fn(&Reference) -> Option<ServiceInstance> + Send + Sync,
{
    fn resolve(&self, reference: &Reference) -> Option<ServiceInstance> {
        self(reference)
    }
}

/// One registry change for a watched descriptor
#[derive(Clone)]
pub struct RegistryNotification {
    /// Kind of change
    pub kind: RegistryEventKind,
    /// Reference as of this change
    pub reference: Reference,
    /// Resolver for the reference's instance
    pub resolver: Arc<dyn InstanceResolver>,
}

impl RegistryNotification {
    /// Build a notification
    pub fn new(
        kind: RegistryEventKind,
        reference: Reference,
        resolver: Arc<dyn InstanceResolver>,
    ) -> Self {
        Self {
            kind,
            reference,
            resolver,
        }
    }
}

impl std::fmt::Debug for RegistryNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryNotification")
            .field("kind", &self.kind)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// Receives registry changes for one watch
pub trait RegistryListener: Send + Sync {
    /// Apply one change; an error reports a contract violation to the registry
    fn notify(&self, notification: RegistryNotification) -> Result<()>;
}

/// Handle identifying one registry watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl WatchId {
    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Registry collaborator consumed by the service manager
pub trait ServiceRegistry: Send + Sync {
    /// Start delivering changes for references matching `descriptor`
    ///
    /// Implementations deliver an `Added` notification for every currently
    /// matching reference before any later change for it.
    fn watch(
        &self,
        descriptor: &ServiceDescriptor,
        listener: Arc<dyn RegistryListener>,
    ) -> Result<WatchId>;

    /// Stop a watch; returns whether it was active
    fn unwatch(&self, id: WatchId) -> bool;
}
