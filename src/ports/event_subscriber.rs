//! EventSubscriber port - Interface for subscribing to named events.
//!
//! Both the in-page bus and the cross-context bus share this contract:
//! `on` registers a handler under an event name, `un` removes one handler
//! or, without a handler, every handler for that name.

use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, NamedEvent};

/// Handler for processing published events.
///
/// Implementations should be:
/// - **Quick** - dispatch is synchronous, slow handlers delay the socket
/// - **Isolated** - a failing handler never stops the ones after it
///
/// # Example
///
/// ```ignore
/// struct TreeRefresher { /* ... */ }
///
/// impl EventHandler<DomainEvent> for TreeRefresher {
///     fn handle(&self, event: &Arc<DomainEvent>) -> Result<(), DomainError> {
///         if let DomainEvent::Content(change) = event.as_ref() { /* ... */ }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "TreeRefresher"
///     }
/// }
/// ```
pub trait EventHandler<E>: Send + Sync {
    fn handle(&self, event: &Arc<E>) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Adapts a closure into an `EventHandler`.
pub struct FnHandler<F> {
    name: &'static str,
    func: F,
}

impl<E, F> EventHandler<E> for FnHandler<F>
where
    F: Fn(&Arc<E>) -> Result<(), DomainError> + Send + Sync,
{
    fn handle(&self, event: &Arc<E>) -> Result<(), DomainError> {
        (self.func)(event)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Wraps a closure as a shareable handler.
///
/// ```ignore
/// bus.on("ContentServerEvent", handler_fn("log", |event| { println!("{event:?}"); Ok(()) }));
/// ```
pub fn handler_fn<E, F>(name: &'static str, func: F) -> Arc<dyn EventHandler<E>>
where
    E: 'static,
    F: Fn(&Arc<E>) -> Result<(), DomainError> + Send + Sync + 'static,
{
    Arc::new(FnHandler { name, func })
}

/// Opaque handle returned by `on`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    event_name: String,
}

impl SubscriptionHandle {
    pub fn new(id: u64, event_name: impl Into<String>) -> Self {
        Self {
            id,
            event_name: event_name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

/// One registry entry.
pub struct Subscription<E> {
    pub handle: SubscriptionHandle,
    pub handler: Arc<dyn EventHandler<E>>,
}

impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Port for subscribing to named events.
pub trait EventSubscriber<E: NamedEvent>: Send + Sync {
    /// Registers `handler` for `event_name`. Registering the same handler
    /// twice makes it run twice.
    fn on(&self, event_name: &str, handler: Arc<dyn EventHandler<E>>) -> SubscriptionHandle;

    /// Removes `handler` (every registration of it) from `event_name`, or
    /// every handler of `event_name` when `handler` is `None`.
    ///
    /// Returns the removed entries.
    fn un(&self, event_name: &str, handler: Option<&Arc<dyn EventHandler<E>>>)
        -> Vec<Subscription<E>>;

    /// Removes the single registration behind `handle`.
    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Option<Subscription<E>>;
}

/// Combined trait for bus implementations.
pub trait EventBus<E: NamedEvent>: super::EventPublisher<E> + EventSubscriber<E> {}

impl<E: NamedEvent, T: super::EventPublisher<E> + EventSubscriber<E>> EventBus<E> for T {}
