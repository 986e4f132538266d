//! Domain Events
//!
//! Events crossing the boundaries of the binding core: registry change kinds
//! flowing in, manager notifications flowing out.

mod manager_events;

pub use manager_events::ManagerEvent;

use serde::{Deserialize, Serialize};

/// Kind of change a registry reports for one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryEventKind {
    /// A matching instance was registered
    Added,
    /// Properties of a registered instance changed
    Modified,
    /// The instance was unregistered
    Removed,
}
