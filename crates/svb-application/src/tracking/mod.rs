//! Dependency Tracking
//!
//! A tracker watches one dependency slot. It keeps every currently matching
//! reference in arrival order, picks the bound ("tracked") subset according
//! to the slot's cardinality and strategies, and reports each change of that
//! subset as a [`BindingTransition`].
//!
//! | Tracker | Cardinality | Tracked value |
//! |---------|-------------|---------------|
//! | [`DependencyTracker`] | unary | one reference or nothing |
//! | [`MultiDependencyTracker`] | multiple | ordered list or nothing (never empty) |
//!
//! Trackers never mutate references and never resolve instances themselves;
//! resolution happens lazily through the [`TrackedRef`]'s resolver.

mod matching;
mod multiple;
mod unary;

pub use multiple::MultiDependencyTracker;
pub use unary::DependencyTracker;

use crate::ports::lifecycle::{DependencyValue, ServiceInstance};
use crate::ports::registry::InstanceResolver;
use std::fmt;
use std::sync::Arc;
use svb_domain::error::Result;
use svb_domain::value_objects::{BindingSpec, Reference, ReferenceId};

/// A matching reference together with the resolver that produced it
#[derive(Clone)]
pub struct TrackedRef {
    reference: Reference,
    resolver: Arc<dyn InstanceResolver>,
}

impl TrackedRef {
    /// Pair a reference with its resolver
    pub fn new(reference: Reference, resolver: Arc<dyn InstanceResolver>) -> Self {
        Self {
            reference,
            resolver,
        }
    }

    /// The reference
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Identity of the reference
    pub fn id(&self) -> ReferenceId {
        self.reference.id()
    }

    /// Resolve the instance behind the reference
    pub fn resolve(&self) -> Option<ServiceInstance> {
        self.resolver.resolve(&self.reference)
    }
}

impl fmt::Debug for TrackedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackedRef({})", self.reference)
    }
}

/// Bound value of a slot
#[derive(Debug, Clone)]
pub enum TrackedValue {
    /// Unary slot
    Single(TrackedRef),
    /// Multiple slot, in binding order; never empty
    Multiple(Vec<TrackedRef>),
}

impl TrackedValue {
    /// Bound references in binding order
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            Self::Single(tracked) => vec![tracked.reference()],
            Self::Multiple(list) => list.iter().map(TrackedRef::reference).collect(),
        }
    }

    /// Identities of the bound references in binding order
    pub fn ids(&self) -> Vec<ReferenceId> {
        self.references().into_iter().map(Reference::id).collect()
    }

    /// Resolve the bound instances
    ///
    /// Unresolvable references are skipped; a value with nothing resolvable
    /// yields `None`.
    pub fn resolve(&self) -> Option<DependencyValue> {
        match self {
            Self::Single(tracked) => tracked.resolve().map(DependencyValue::Single),
            Self::Multiple(list) => {
                let instances: Vec<ServiceInstance> =
                    list.iter().filter_map(TrackedRef::resolve).collect();
                (!instances.is_empty()).then_some(DependencyValue::Multiple(instances))
            }
        }
    }
}

/// Kind of change in a slot's bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// A reference became bound (possibly replacing another)
    Available,
    /// A bound reference went away
    Unavailable,
    /// Properties of a bound reference changed
    Modified,
}

/// Change of a slot's bound value
///
/// `Available` always carries `current`; `Unavailable` always carries
/// `previous`. An EAGER replacement carries both, so the lifecycle can choose
/// make-before-break or break-before-make.
#[derive(Debug, Clone)]
pub struct BindingTransition {
    /// Slot name
    pub slot: String,
    /// Kind of change
    pub kind: TransitionKind,
    /// Bound value before the change
    pub previous: Option<TrackedValue>,
    /// Bound value after the change
    pub current: Option<TrackedValue>,
}

/// Behaviour shared by unary and multiple trackers
pub trait DependencyTracking: Send {
    /// Binding the tracker applies
    fn binding(&self) -> &BindingSpec;

    /// A reference now matches the slot's descriptor
    fn on_reference_added(&mut self, reference: TrackedRef) -> Result<Vec<BindingTransition>>;

    /// Properties of a matching reference changed; it still matches
    fn on_reference_modified(&mut self, reference: TrackedRef) -> Result<Vec<BindingTransition>>;

    /// A matching reference went away
    fn on_reference_removed(&mut self, reference: &Reference) -> Result<Vec<BindingTransition>>;

    /// Current bound value, side-effect free
    fn tracked_dependency(&self) -> Option<TrackedValue>;

    /// Whether `id` is in the matching set
    fn is_matching(&self, id: ReferenceId) -> bool;

    /// Number of matching references
    fn matching_count(&self) -> usize;

    /// Stop admitting late arrivals under a STATIC update strategy
    fn freeze(&mut self) {}

    /// Slot name
    fn slot(&self) -> &str {
        self.binding().name()
    }

    /// Whether something is bound
    fn is_satisfied(&self) -> bool {
        self.tracked_dependency().is_some()
    }
}

/// Tracker matching the binding's cardinality
pub fn tracker_for(binding: BindingSpec) -> Box<dyn DependencyTracking> {
    if binding.cardinality().is_multiple() {
        Box::new(MultiDependencyTracker::from_binding(binding))
    } else {
        Box::new(DependencyTracker::from_binding(binding))
    }
}
