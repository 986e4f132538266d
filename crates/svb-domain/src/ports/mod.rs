//! Functional Ports
//!
//! Single-method interfaces used to wire collaborators together without
//! coupling to concrete types. Closures implement them through blanket
//! impls, so `|event: &ManagerEvent| ...` is a valid [`Listener`].

mod notifier;

pub use notifier::{ListenerId, Notifier};

/// Converts one value into another
///
/// Used at boundaries where a backend-specific event must be translated into
/// the binding core's vocabulary.
pub trait Adapter<I, O>: Send + Sync {
    /// Translate `input`
    fn adapt(&self, input: I) -> O;
}

impl<I, O, F> Adapter<I, O> for F
where
    F: Fn(I) -> O + Send + Sync,
{
    fn adapt(&self, input: I) -> O {
        self(input)
    }
}

/// Receives events of type `E`
pub trait Listener<E>: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &E);
}

impl<E, F> Listener<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        self(event);
    }
}
