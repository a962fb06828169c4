//! In-memory event bus.
//!
//! The in-page bus: handlers are invoked synchronously, in registration
//! order, on the thread that fires the event.
//!
//! Dispatch iterates over a snapshot of the handler list, so a handler may
//! register or unregister (itself included) while it runs without
//! affecting the remaining handlers of that dispatch. A handler returning
//! an error or panicking is logged and skipped.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::NamedEvent;
use crate::ports::{EventHandler, EventPublisher, EventSubscriber, Subscription, SubscriptionHandle};

/// In-memory event bus.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::<DomainEvent>::new());
///
/// bus.on(event_names::CONTENT_SERVER_EVENT, handler_fn("tree", |event| { /* ... */ Ok(()) }));
/// bus.fire(Arc::new(event));
/// ```
pub struct InMemoryEventBus<E> {
    handlers: RwLock<HashMap<String, Vec<Subscription<E>>>>,
    next_id: AtomicU64,
}

impl<E: NamedEvent> InMemoryEventBus<E> {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Dispatches `event` to the handlers registered under `event_name`.
    ///
    /// Returns how many handlers completed successfully.
    pub fn dispatch(&self, event_name: &str, event: Arc<E>) -> usize {
        let snapshot: Vec<Subscription<E>> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers.get(event_name).cloned().unwrap_or_default()
        };

        let mut delivered = 0;
        for subscription in snapshot {
            let handler = &subscription.handler;
            match catch_unwind(AssertUnwindSafe(|| handler.handle(&event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(error)) => {
                    tracing::warn!(
                        event = event_name,
                        handler = handler.name(),
                        error = %error,
                        "Event handler failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        event = event_name,
                        handler = handler.name(),
                        "Event handler panicked"
                    );
                }
            }
        }
        delivered
    }

    /// Number of handlers registered under `event_name`.
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .map_or(0, Vec::len)
    }
}

impl<E: NamedEvent> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: NamedEvent> EventPublisher<E> for InMemoryEventBus<E> {
    fn fire(&self, event: Arc<E>) {
        let name = event.event_name();
        let delivered = self.dispatch(name, event);
        tracing::trace!(event = name, delivered, "Event fired");
    }
}

impl<E: NamedEvent> EventSubscriber<E> for InMemoryEventBus<E> {
    fn on(&self, event_name: &str, handler: Arc<dyn EventHandler<E>>) -> SubscriptionHandle {
        let handle = SubscriptionHandle::new(
            self.next_id.fetch_add(1, Ordering::Relaxed),
            event_name,
        );

        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(event_name.to_string())
            .or_default()
            .push(Subscription {
                handle: handle.clone(),
                handler,
            });
        handle
    }

    fn un(
        &self,
        event_name: &str,
        handler: Option<&Arc<dyn EventHandler<E>>>,
    ) -> Vec<Subscription<E>> {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);

        let Some(bucket) = handlers.get_mut(event_name) else {
            return Vec::new();
        };

        let removed = match handler {
            None => std::mem::take(bucket),
            Some(target) => {
                let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(bucket)
                    .into_iter()
                    .partition(|s| Arc::ptr_eq(&s.handler, target));
                *bucket = kept;
                removed
            }
        };

        if bucket.is_empty() {
            handlers.remove(event_name);
        }
        removed
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Option<Subscription<E>> {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);

        let bucket = handlers.get_mut(handle.event_name())?;
        let index = bucket.iter().position(|s| &s.handle == handle)?;
        let removed = bucket.remove(index);

        if bucket.is_empty() {
            handlers.remove(handle.event_name());
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use crate::ports::handler_fn;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    impl NamedEvent for Ping {
        fn event_name(&self) -> &'static str {
            "Ping"
        }
    }

    fn counting(counter: &Arc<AtomicUsize>) -> Arc<dyn EventHandler<Ping>> {
        let counter = Arc::clone(counter);
        handler_fn("counting", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn handler_receives_the_same_instance() {
        let bus = InMemoryEventBus::<Ping>::new();
        let seen: Arc<Mutex<Option<Arc<Ping>>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&seen);
        bus.on(
            "Ping",
            handler_fn("capture", move |event| {
                *slot.lock().unwrap() = Some(Arc::clone(event));
                Ok(())
            }),
        );

        let event = Arc::new(Ping(7));
        bus.fire(Arc::clone(&event));

        let received = seen.lock().unwrap().clone().unwrap();
        assert!(Arc::ptr_eq(&received, &event));
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let bus = InMemoryEventBus::<Ping>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.on(
                "Ping",
                handler_fn(label, move |_| {
                    order.lock().unwrap().push(label);
                    Ok(())
                }),
            );
        }

        bus.fire(Arc::new(Ping(1)));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn duplicate_registration_runs_twice() {
        let bus = InMemoryEventBus::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = counting(&counter);

        bus.on("Ping", Arc::clone(&handler));
        bus.on("Ping", Arc::clone(&handler));
        bus.fire(Arc::new(Ping(1)));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn other_event_names_are_not_dispatched() {
        let bus = InMemoryEventBus::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.on("Pong", counting(&counter));

        bus.fire(Arc::new(Ping(1)));

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_handler_does_not_stop_the_rest() {
        let bus = InMemoryEventBus::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.on(
            "Ping",
            handler_fn("failing", |_| Err(DomainError::handler_failed("failing", "boom"))),
        );
        bus.on("Ping", handler_fn("panicking", |_| panic!("handler exploded")));
        bus.on("Ping", counting(&counter));

        let delivered = bus.dispatch("Ping", Arc::new(Ping(1)));

        assert_eq!(delivered, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_removing_itself_keeps_later_handlers_in_dispatch() {
        let bus = Arc::new(InMemoryEventBus::<Ping>::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let weak_bus = Arc::downgrade(&bus);
        bus.on(
            "Ping",
            handler_fn("self-removing", move |_| {
                if let Some(bus) = weak_bus.upgrade() {
                    bus.un("Ping", None);
                }
                Ok(())
            }),
        );
        bus.on("Ping", counting(&counter));

        bus.fire(Arc::new(Ping(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        bus.fire(Arc::new(Ping(2)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn un_with_handler_removes_only_that_handler() {
        let bus = InMemoryEventBus::<Ping>::new();
        let kept_counter = Arc::new(AtomicUsize::new(0));
        let removed_counter = Arc::new(AtomicUsize::new(0));

        let removed_handler = counting(&removed_counter);
        bus.on("Ping", Arc::clone(&removed_handler));
        bus.on("Ping", counting(&kept_counter));
        bus.on("Ping", Arc::clone(&removed_handler));

        let removed = bus.un("Ping", Some(&removed_handler));
        assert_eq!(removed.len(), 2);
        assert_eq!(bus.handler_count("Ping"), 1);

        bus.fire(Arc::new(Ping(1)));
        assert_eq!(kept_counter.load(Ordering::SeqCst), 1);
        assert_eq!(removed_counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn un_without_handler_clears_the_bucket() {
        let bus = InMemoryEventBus::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.on("Ping", counting(&counter));
        bus.on("Ping", counting(&counter));

        let removed = bus.un("Ping", None);

        assert_eq!(removed.len(), 2);
        assert_eq!(bus.handler_count("Ping"), 0);
        assert!(bus.un("Ping", None).is_empty());
    }

    #[test]
    fn unsubscribe_removes_single_registration() {
        let bus = InMemoryEventBus::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = counting(&counter);

        let first = bus.on("Ping", Arc::clone(&handler));
        bus.on("Ping", Arc::clone(&handler));

        assert!(bus.unsubscribe(&first).is_some());
        assert!(bus.unsubscribe(&first).is_none());

        bus.fire(Arc::new(Ping(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handles_are_unique() {
        let bus = InMemoryEventBus::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let a = bus.on("Ping", counting(&counter));
        let b = bus.on("Ping", counting(&counter));

        assert_ne!(a, b);
        assert_eq!(a.event_name(), "Ping");
    }
}
