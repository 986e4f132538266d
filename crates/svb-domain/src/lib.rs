//! # Domain Layer
//!
//! Core types of the service-binding system. Pure data and rules, no I/O.
//!
//! ## Module Categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`value_objects`] | References, filters, descriptors, binding specs, play-state |
//! | [`events`] | Registry change kinds and manager notifications |
//! | [`ports`] | `Adapter` / `Listener` interfaces and the `Notifier` fan-out |
//! | [`error`] | Domain error type and `Result` alias |
//! | [`constants`] | Well-known property keys |

pub mod constants;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use events::{ManagerEvent, RegistryEventKind};
pub use ports::{Adapter, Listener, ListenerId, Notifier};
pub use value_objects::*;
