//! Unit tests for the list-valued dependency tracker

use crate::test_utils::{IFACE_A, binding, ids, reference, tracked};
use svb_application::{DependencyTracking, MultiDependencyTracker, TransitionKind};
use svb_domain::{Cardinality, UpdateStrategy};

fn tracker(update: UpdateStrategy) -> MultiDependencyTracker {
    MultiDependencyTracker::new(binding(Cardinality::MandatoryMultiple, update)).unwrap()
}

#[test]
fn test_rejects_unary_cardinality() {
    let result = MultiDependencyTracker::new(binding(
        Cardinality::MandatoryUnary,
        UpdateStrategy::Lazy,
    ));
    assert!(result.is_err());
}

#[test]
fn test_lazy_lists_in_arrival_order() {
    let mut tracker = tracker(UpdateStrategy::Lazy);
    assert!(tracker.tracked_dependency().is_none());

    for id in 1..=3 {
        let transitions = tracker.on_reference_added(tracked(id, IFACE_A)).unwrap();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].kind, TransitionKind::Available);
    }
    assert_eq!(ids(tracker.tracked_dependency()), vec![1, 2, 3]);

    let transitions = tracker.on_reference_removed(&reference(2, IFACE_A)).unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].kind, TransitionKind::Unavailable);
    assert_eq!(ids(transitions[0].previous.clone()), vec![1, 2, 3]);
    assert_eq!(ids(transitions[0].current.clone()), vec![1, 3]);
}

#[test]
fn test_empty_list_is_reported_as_none() {
    let mut tracker = tracker(UpdateStrategy::Lazy);
    tracker.on_reference_added(tracked(1, IFACE_A)).unwrap();

    let transitions = tracker.on_reference_removed(&reference(1, IFACE_A)).unwrap();
    assert!(transitions[0].current.is_none());
    assert!(tracker.tracked_dependency().is_none());
    assert!(!tracker.is_satisfied());
}

#[test]
fn test_eager_lists_most_recent_first() {
    let mut tracker = tracker(UpdateStrategy::Eager);
    for id in 1..=3 {
        tracker.on_reference_added(tracked(id, IFACE_A)).unwrap();
    }
    assert_eq!(ids(tracker.tracked_dependency()), vec![3, 2, 1]);
}

#[test]
fn test_static_freezes_after_creation() {
    let mut tracker = tracker(UpdateStrategy::Static);
    tracker.on_reference_added(tracked(1, IFACE_A)).unwrap();
    tracker.on_reference_added(tracked(2, IFACE_A)).unwrap();
    tracker.freeze();
    assert!(tracker.is_frozen());

    assert!(tracker.on_reference_added(tracked(3, IFACE_A)).unwrap().is_empty());
    assert_eq!(ids(tracker.tracked_dependency()), vec![1, 2]);
    assert_eq!(tracker.matching_count(), 3);

    // Late arrival was never bound, so its removal changes nothing
    assert!(tracker.on_reference_removed(&reference(3, IFACE_A)).unwrap().is_empty());

    let transitions = tracker.on_reference_removed(&reference(1, IFACE_A)).unwrap();
    assert_eq!(ids(transitions[0].current.clone()), vec![2]);
}

#[test]
fn test_freeze_ignored_for_dynamic_strategies() {
    let mut tracker = tracker(UpdateStrategy::Lazy);
    tracker.freeze();
    assert!(!tracker.is_frozen());
    tracker.on_reference_added(tracked(1, IFACE_A)).unwrap();
    assert_eq!(ids(tracker.tracked_dependency()), vec![1]);
}

#[test]
fn test_modified_member_emits_modified() {
    let mut tracker = tracker(UpdateStrategy::Lazy);
    tracker.on_reference_added(tracked(1, IFACE_A)).unwrap();
    tracker.on_reference_added(tracked(2, IFACE_A)).unwrap();

    let updated = svb_application::TrackedRef::new(
        reference(2, IFACE_A).with_property("zone", "eu"),
        crate::test_utils::provider_resolver(),
    );
    let transitions = tracker.on_reference_modified(updated).unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].kind, TransitionKind::Modified);

    let current = tracker.tracked_dependency().unwrap();
    assert_eq!(current.references()[1].property("zone"), Some("eu"));
}

#[test]
fn test_duplicate_add_is_a_contract_violation() {
    let mut tracker = tracker(UpdateStrategy::Lazy);
    tracker.on_reference_added(tracked(1, IFACE_A)).unwrap();
    let err = tracker.on_reference_added(tracked(1, IFACE_A)).unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(ids(tracker.tracked_dependency()), vec![1]);
}
