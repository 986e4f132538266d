//! Configuration types module

pub mod app;
pub mod events;
pub mod logging;
pub mod manager;

// Re-export main types
pub use app::AppConfig;
pub use events::EventBusConfig;
pub use logging::LoggingConfig;
pub use manager::ManagerConfig;
