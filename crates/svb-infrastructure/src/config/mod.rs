//! Configuration management
//!
//! Layered loading with figment: defaults, then a TOML file, then
//! `SVB__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
