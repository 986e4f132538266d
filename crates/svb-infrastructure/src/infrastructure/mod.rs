//! Runtime infrastructure
//!
//! Async plumbing around service managers: the broadcast bus carrying their
//! events, and the pump that feeds them from external notification streams.

pub mod events;
pub mod pump;
