//! List-valued dependency tracker

use super::matching::MatchingSet;
use super::{BindingTransition, DependencyTracking, TrackedRef, TrackedValue, TransitionKind};
use svb_domain::error::{Error, Result};
use svb_domain::value_objects::{
    BindingSpec, BindingStrategy, Reference, ReferenceId, UpdateStrategy,
};
use tracing::debug;

/// Tracker for `MandatoryMultiple` / `OptionalMultiple` slots
///
/// The tracked value lists the bound references most-recent-first under an
/// EAGER binding strategy and oldest-first under LAZY. With nothing bound,
/// [`DependencyTracking::tracked_dependency`] returns `None`, never an empty
/// list.
#[derive(Debug)]
pub struct MultiDependencyTracker {
    binding: BindingSpec,
    matching: MatchingSet,
    /// Bound ids in arrival order
    tracked: Vec<ReferenceId>,
    frozen: bool,
}

impl MultiDependencyTracker {
    /// Tracker for a multiple binding
    pub fn new(binding: BindingSpec) -> Result<Self> {
        if !binding.cardinality().is_multiple() {
            return Err(Error::invalid_argument(format!(
                "slot '{}' has unary cardinality; use DependencyTracker",
                binding.name()
            )));
        }
        Ok(Self::from_binding(binding))
    }

    pub(crate) fn from_binding(binding: BindingSpec) -> Self {
        Self {
            binding,
            matching: MatchingSet::default(),
            tracked: Vec::new(),
            frozen: false,
        }
    }

    /// Whether late arrivals are excluded
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn current_value(&self) -> Option<TrackedValue> {
        let mut list: Vec<TrackedRef> = self
            .matching
            .iter()
            .filter(|entry| self.tracked.contains(&entry.id()))
            .cloned()
            .collect();
        if list.is_empty() {
            return None;
        }
        if self.binding.binding_strategy() == BindingStrategy::Eager {
            list.reverse();
        }
        Some(TrackedValue::Multiple(list))
    }

    fn transition(
        &self,
        kind: TransitionKind,
        previous: Option<TrackedValue>,
    ) -> BindingTransition {
        BindingTransition {
            slot: self.binding.name().to_string(),
            kind,
            previous,
            current: self.current_value(),
        }
    }
}

impl DependencyTracking for MultiDependencyTracker {
    fn binding(&self) -> &BindingSpec {
        &self.binding
    }

    fn on_reference_added(&mut self, reference: TrackedRef) -> Result<Vec<BindingTransition>> {
        let id = reference.id();
        self.matching.insert(&self.binding, reference)?;
        if self.frozen {
            debug!(
                slot = %self.binding.name(),
                reference = %id,
                "Static slot frozen; late arrival not bound"
            );
            return Ok(Vec::new());
        }

        let previous = self.current_value();
        self.tracked.push(id);
        Ok(vec![self.transition(TransitionKind::Available, previous)])
    }

    fn on_reference_modified(&mut self, reference: TrackedRef) -> Result<Vec<BindingTransition>> {
        let id = reference.id();
        let previous = self.current_value();
        self.matching.replace(&self.binding, reference)?;
        if self.tracked.contains(&id) {
            return Ok(vec![self.transition(TransitionKind::Modified, previous)]);
        }
        Ok(Vec::new())
    }

    fn on_reference_removed(&mut self, reference: &Reference) -> Result<Vec<BindingTransition>> {
        let previous = self.current_value();
        let removed = self.matching.remove(&self.binding, reference)?;
        let Some(index) = self.tracked.iter().position(|id| *id == removed.id()) else {
            return Ok(Vec::new());
        };
        self.tracked.remove(index);
        Ok(vec![self.transition(TransitionKind::Unavailable, previous)])
    }

    fn tracked_dependency(&self) -> Option<TrackedValue> {
        self.current_value()
    }

    fn is_matching(&self, id: ReferenceId) -> bool {
        self.matching.contains(id)
    }

    fn matching_count(&self) -> usize {
        self.matching.len()
    }

    fn freeze(&mut self) {
        if self.binding.update_strategy() == UpdateStrategy::Static {
            self.frozen = true;
        }
    }
}
