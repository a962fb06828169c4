//! Callback registries for channel notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

/// Ordered list of listeners.
///
/// Registering the same `Arc` twice makes it run twice. `notify` works on a
/// snapshot, so listeners may add or remove entries while being notified.
pub struct Listeners<F: ?Sized> {
    entries: Mutex<Vec<Arc<F>>>,
}

impl<F: ?Sized> Listeners<F> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Arc<F>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Removes every registration of `listener`. Returns whether any existed.
    pub fn remove(&self, listener: &Arc<F>) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| !Arc::ptr_eq(entry, listener));
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes `call` for each listener in registration order. A panicking
    /// listener is logged and the rest still run.
    pub fn notify(&self, kind: &'static str, call: impl Fn(&F)) {
        let snapshot: Vec<Arc<F>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| call(&listener))).is_err() {
                tracing::warn!(listener = kind, "Listener panicked");
            }
        }
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}
