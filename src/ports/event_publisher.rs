//! EventPublisher port - Interface for firing events onto a bus.
//!
//! Firing is synchronous: every handler registered for the event's name
//! has run (or been carried to the other context) when `fire` returns.

use std::sync::Arc;

use crate::domain::foundation::NamedEvent;

/// Port for publishing named events.
///
/// # Example
///
/// ```ignore
/// let event = Arc::new(DomainEvent::Content(change));
/// bus.fire(Arc::clone(&event));
/// ```
pub trait EventPublisher<E: NamedEvent>: Send + Sync {
    /// Dispatches `event` under its own `event_name()`.
    ///
    /// Handlers receive the same `Arc`, never a copy.
    fn fire(&self, event: Arc<E>);
}
