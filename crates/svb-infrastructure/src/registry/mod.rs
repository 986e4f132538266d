//! Service registry implementations
//!
//! [`InMemoryRegistry`] implements the application's `ServiceRegistry` port
//! in-process. Its watches can also be consumed as async streams.

mod memory;

pub use memory::InMemoryRegistry;

use futures::Stream;
use std::pin::Pin;
use svb_application::ports::registry::RegistryNotification;

/// Stream of registry notifications for one watch
pub type NotificationStream = Pin<Box<dyn Stream<Item = RegistryNotification> + Send>>;
