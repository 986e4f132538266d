//! Logging Tests

use svb_domain::events::ManagerEvent;
use svb_domain::ports::Listener;
use svb_domain::value_objects::PlayState;
use svb_infrastructure::constants::DEFAULT_LOG_LEVEL;
use svb_infrastructure::logging::{LoggingConfig, LoggingListener, parse_log_level};
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);

    assert!(parse_log_level("invalid").is_err());
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    assert!(!config.json_format);
    assert!(config.file_output.is_none());
}

#[test]
fn test_logging_listener_accepts_every_event() {
    let listener = LoggingListener;
    let events = [
        ManagerEvent::StateChanged {
            manager: "m".into(),
            state: PlayState::Running,
            previous: PlayState::Pending,
        },
        ManagerEvent::ServiceReplaced {
            manager: "m".into(),
            slot: "db".into(),
        },
        ManagerEvent::CreationFailed {
            manager: "m".into(),
            message: "no".into(),
        },
        ManagerEvent::UpdateFailed {
            manager: "m".into(),
            slot: "db".into(),
            message: "no".into(),
        },
        ManagerEvent::DisposalFailed {
            manager: "m".into(),
            message: "no".into(),
        },
    ];
    for event in &events {
        listener.on_event(event);
    }
}
