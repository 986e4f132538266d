//! Unit tests for manager events and play-state

use svb_domain::{ManagerEvent, PlayState};

#[test]
fn test_play_state_default_is_pending() {
    assert_eq!(PlayState::default(), PlayState::Pending);
}

#[test]
fn test_play_state_u8_encoding() {
    for state in [PlayState::Pending, PlayState::Running, PlayState::Stopped] {
        assert_eq!(PlayState::from_u8(state.as_u8()), state);
    }
    assert_eq!(PlayState::from_u8(200), PlayState::Stopped);
}

#[test]
fn test_manager_event_serialization_is_tagged() {
    let event = ManagerEvent::StateChanged {
        manager: "billing".to_string(),
        state: PlayState::Running,
        previous: PlayState::Pending,
    };
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["type"], "state_changed");
    assert_eq!(json["state"], "running");
    assert_eq!(json["previous"], "pending");
}

#[test]
fn test_failure_classification() {
    let failed = ManagerEvent::CreationFailed {
        manager: "billing".to_string(),
        message: "boom".to_string(),
    };
    assert!(failed.is_failure());
    assert_eq!(failed.manager(), "billing");

    let replaced = ManagerEvent::ServiceReplaced {
        manager: "billing".to_string(),
        slot: "db".to_string(),
    };
    assert!(!replaced.is_failure());
}
