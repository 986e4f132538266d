//! Application Layer - Service Binding
//!
//! Implements the dependency tracking and service-binding lifecycle:
//! trackers turn registry notifications into bound values per slot, and the
//! [`ServiceManager`] aggregates them into create / update / dispose calls on
//! a [`ServiceLifecycle`].
//!
//! ## Ports (Interfaces)
//!
//! - `ports::lifecycle`: the lifecycle collaborator and the dependency map it receives
//! - `ports::registry`: the registry collaborator (watch + lazy instance resolution)
//!
//! ## Dependencies
//!
//! This crate depends only on `svb-domain` and small pure-Rust libraries.

pub mod lifecycle;
pub mod ports;
pub mod tracking;

pub use lifecycle::{ServiceManager, ServiceManagerBuilder};
pub use ports::*;
pub use tracking::{
    BindingTransition, DependencyTracker, DependencyTracking, MultiDependencyTracker, TrackedRef,
    TrackedValue, TransitionKind, tracker_for,
};
