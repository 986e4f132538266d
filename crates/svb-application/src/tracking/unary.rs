//! Single-valued dependency tracker
//!
//! Each unary slot is a two-state machine:
//!
//! ```text
//!            first qualifying add
//!   EMPTY ─────────────────────────▶ BOUND ──┐ EAGER arrival /
//!     ▲                                │     │ removal with promotion
//!     └──── bound ref removed, ────────┘ ◀───┘
//!           no eligible replacement
//! ```
//!
//! The update strategy decides whether a bound value may be replaced; the
//! binding strategy decides which remaining reference is promoted.

use super::matching::MatchingSet;
use super::{BindingTransition, DependencyTracking, TrackedRef, TrackedValue, TransitionKind};
use svb_domain::error::{Error, Result};
use svb_domain::value_objects::{BindingSpec, Reference, ReferenceId, UpdateStrategy};
use tracing::debug;

/// Tracker for `MandatoryUnary` / `OptionalUnary` slots
#[derive(Debug)]
pub struct DependencyTracker {
    binding: BindingSpec,
    matching: MatchingSet,
    tracked: Option<ReferenceId>,
    /// STATIC slot lost its binding; it stays empty for good
    exhausted: bool,
}

impl DependencyTracker {
    /// Tracker for a unary binding
    pub fn new(binding: BindingSpec) -> Result<Self> {
        if binding.cardinality().is_multiple() {
            return Err(Error::invalid_argument(format!(
                "slot '{}' has multiple cardinality; use MultiDependencyTracker",
                binding.name()
            )));
        }
        Ok(Self::from_binding(binding))
    }

    pub(crate) fn from_binding(binding: BindingSpec) -> Self {
        Self {
            binding,
            matching: MatchingSet::default(),
            tracked: None,
            exhausted: false,
        }
    }

    /// Whether a STATIC slot has permanently lost its binding
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn tracked_ref(&self) -> Option<&TrackedRef> {
        self.tracked.and_then(|id| self.matching.get(id))
    }

    fn transition(
        &self,
        kind: TransitionKind,
        previous: Option<TrackedRef>,
        current: Option<TrackedRef>,
    ) -> BindingTransition {
        BindingTransition {
            slot: self.binding.name().to_string(),
            kind,
            previous: previous.map(TrackedValue::Single),
            current: current.map(TrackedValue::Single),
        }
    }

    fn bind_preferred(&mut self, previous: Option<TrackedRef>) -> Option<BindingTransition> {
        let candidate = self
            .matching
            .preferred(self.binding.binding_strategy())?
            .clone();
        if previous.as_ref().is_some_and(|p| p.id() == candidate.id()) {
            return None;
        }
        debug!(
            slot = %self.binding.name(),
            reference = %candidate.reference(),
            "Bound dependency"
        );
        self.tracked = Some(candidate.id());
        Some(self.transition(TransitionKind::Available, previous, Some(candidate)))
    }
}

impl DependencyTracking for DependencyTracker {
    fn binding(&self) -> &BindingSpec {
        &self.binding
    }

    fn on_reference_added(&mut self, reference: TrackedRef) -> Result<Vec<BindingTransition>> {
        self.matching.insert(&self.binding, reference)?;

        let current = self.tracked_ref().cloned();
        let transition = match (current, self.binding.update_strategy()) {
            (None, _) if self.exhausted => None,
            (None, _) => self.bind_preferred(None),
            (Some(_), UpdateStrategy::Static | UpdateStrategy::Lazy) => None,
            (Some(bound), UpdateStrategy::Eager) => self.bind_preferred(Some(bound)),
        };
        Ok(transition.into_iter().collect())
    }

    fn on_reference_modified(&mut self, reference: TrackedRef) -> Result<Vec<BindingTransition>> {
        let id = reference.id();
        let previous = self.matching.replace(&self.binding, reference.clone())?;
        if self.tracked == Some(id) {
            return Ok(vec![self.transition(
                TransitionKind::Modified,
                Some(previous),
                Some(reference),
            )]);
        }
        Ok(Vec::new())
    }

    fn on_reference_removed(&mut self, reference: &Reference) -> Result<Vec<BindingTransition>> {
        let removed = self.matching.remove(&self.binding, reference)?;
        if self.tracked != Some(removed.id()) {
            return Ok(Vec::new());
        }

        self.tracked = None;
        debug!(
            slot = %self.binding.name(),
            reference = %removed.reference(),
            "Bound dependency went away"
        );
        let mut transitions =
            vec![self.transition(TransitionKind::Unavailable, Some(removed), None)];

        if self.binding.update_strategy() == UpdateStrategy::Static {
            self.exhausted = true;
        } else if let Some(promoted) = self.bind_preferred(None) {
            transitions.push(promoted);
        }
        Ok(transitions)
    }

    fn tracked_dependency(&self) -> Option<TrackedValue> {
        self.tracked_ref().cloned().map(TrackedValue::Single)
    }

    fn is_matching(&self, id: ReferenceId) -> bool {
        self.matching.contains(id)
    }

    fn matching_count(&self) -> usize {
        self.matching.len()
    }
}
