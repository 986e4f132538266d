//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that support the application and domain layers.
//!
//! ## Module Categories
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered TOML + environment configuration |
//! | [`constants`] | Centralized configuration constants |
//! | [`bootstrap`] | Builds managers from loaded configuration |
//!
//! ### Registry & Events
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | In-process service registry and watch streams |
//! | [`infrastructure`] | Manager event bus and the notification pump |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context extension for foreign errors |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod infrastructure;
pub mod logging;
pub mod registry;

// Re-export commonly used types
pub use bootstrap::ManagerBootstrap;
pub use config::{AppConfig, ConfigLoader};
pub use error_ext::ErrorContext;
pub use infrastructure::events::{ManagerEventBus, ManagerEventStream};
pub use infrastructure::pump::{pump_notifications, spawn_notification_pump};
pub use logging::{LoggingListener, init_logging};
pub use registry::{InMemoryRegistry, NotificationStream};
