//! Value Objects
//!
//! Immutable types describing references, the descriptors that select them,
//! and the binding rules of dependency slots.

/// Dependency declarations, strategies and binding specs
pub mod binding;
/// Class-name + filter descriptors
pub mod descriptor;
/// LDAP-style property filters
pub mod filter;
/// Registry references
pub mod reference;
/// Manager play-state
pub mod state;

pub use binding::{
    BindingOverride, BindingSpec, BindingStrategy, Cardinality, DependencySpec, UpdateStrategy,
};
pub use descriptor::ServiceDescriptor;
pub use filter::{Filter, PropertyLookup};
pub use reference::{Reference, ReferenceId};
pub use state::PlayState;
