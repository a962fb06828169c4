//! Bridge from the server event channel to the event buses.
//!
//! # Event Flow
//!
//! ```text
//! ServerEventChannel
//!          │  on_server_event
//!          ▼
//! ┌────────────────────┐
//! │ ServerEventsBridge │
//! └────────────────────┘
//!          │
//!          ├──────────────► EventBus.fire (in-process handlers)
//!          │
//!          └──────────────► relay.fire (other context, when set)
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use super::server_event_channel::{ServerEventChannel, ServerEventListener};
use crate::domain::events::DomainEvent;
use crate::ports::{EventBus, EventPublisher};

/// Republishes every translated server event.
pub struct ServerEventsBridge {
    bus: Arc<dyn EventBus<DomainEvent>>,
    relay: RwLock<Option<Arc<dyn EventPublisher<DomainEvent>>>>,
}

impl ServerEventsBridge {
    pub fn new(bus: Arc<dyn EventBus<DomainEvent>>) -> Self {
        Self {
            bus,
            relay: RwLock::new(None),
        }
    }

    /// Create as an Arc (for sharing with the channel listener).
    pub fn new_shared(bus: Arc<dyn EventBus<DomainEvent>>) -> Arc<Self> {
        Arc::new(Self::new(bus))
    }

    /// Also forwards events to `relay`, typically a cross-context bus.
    /// `None` stops relaying.
    pub fn set_relay(&self, relay: Option<Arc<dyn EventPublisher<DomainEvent>>>) {
        *self.relay.write().unwrap_or_else(PoisonError::into_inner) = relay;
    }

    pub fn has_relay(&self) -> bool {
        self.relay
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Subscribes to the channel's server events. The returned listener
    /// detaches the bridge when passed to `un_server_event`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let bridge = ServerEventsBridge::new_shared(bus);
    /// let listener = bridge.register(&channel);
    /// ```
    pub fn register(self: &Arc<Self>, channel: &ServerEventChannel) -> Arc<ServerEventListener> {
        let bridge = Arc::clone(self);
        channel.on_server_event(move |event| bridge.publish(event))
    }

    /// Fires `event` on the bus, then on the relay.
    pub fn publish(&self, event: &Arc<DomainEvent>) {
        self.bus.fire(Arc::clone(event));

        let relay = self
            .relay
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(relay) = relay {
            relay.fire(Arc::clone(event));
        }
    }
}
