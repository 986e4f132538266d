//! Service Lifecycle Management
//!
//! The [`ServiceManager`] owns the trackers of one lifecycle instance and
//! decides when the service is created, updated or disposed.
//!
//! ## Architecture
//!
//! ```text
//!   registry ──notify──▶ SlotListener("db") ──┐
//!   registry ──notify──▶ SlotListener("log") ─┼──▶ ServiceManager ──▶ ServiceLifecycle
//!                                             │     (one lock)        create / update / dispose
//!                                             │        │
//!                                             │        └──▶ Notifier<ManagerEvent>
//! ```
//!
//! Readiness is recomputed from every tracker after each tracker operation,
//! never patched incrementally.

mod builder;
mod manager;

pub use builder::ServiceManagerBuilder;
pub use manager::ServiceManager;
