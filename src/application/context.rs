//! Process context for server events.
//!
//! Built once at startup and passed to whatever needs to publish or
//! subscribe. It owns the in-process event bus and guards two
//! construction-time invariants:
//!
//! - at most one `ServerEventChannel`: asking again with the same
//!   `ConnectionConfig` returns the existing channel, a different config
//!   is a `ChannelConflict` error;
//! - at most one `CrossContextEventBus`: asking again with a link to the
//!   same target returns the existing bus, another target is a
//!   `ContextConflict` error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::bridge::ServerEventsBridge;
use super::server_event_channel::ServerEventChannel;
use crate::adapters::{CrossContextEventBus, InMemoryEventBus};
use crate::domain::connection::ConnectionConfig;
use crate::domain::events::DomainEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ContextLink, EventPublisher, SocketConnector};

pub struct ServerEventsContext {
    connector: Arc<dyn SocketConnector>,
    bus: Arc<InMemoryEventBus<DomainEvent>>,
    bridge: Arc<ServerEventsBridge>,
    channel: Mutex<Option<Arc<ServerEventChannel>>>,
    cross_context: Mutex<Option<Arc<CrossContextEventBus<DomainEvent>>>>,
}

impl ServerEventsContext {
    pub fn new(connector: Arc<dyn SocketConnector>) -> Self {
        let bus: Arc<InMemoryEventBus<DomainEvent>> = Arc::new(InMemoryEventBus::new());
        let bridge = ServerEventsBridge::new_shared(bus.clone());
        Self {
            connector,
            bus,
            bridge,
            channel: Mutex::new(None),
            cross_context: Mutex::new(None),
        }
    }

    /// The in-process bus every translated server event is fired on.
    pub fn event_bus(&self) -> Arc<InMemoryEventBus<DomainEvent>> {
        Arc::clone(&self.bus)
    }

    /// The process-wide server event channel for `config`.
    ///
    /// The first call creates the channel and wires it to the event bus;
    /// it is not connected yet.
    pub fn server_event_channel(
        &self,
        config: ConnectionConfig,
    ) -> Result<Arc<ServerEventChannel>, DomainError> {
        let mut slot = lock(&self.channel);

        if let Some(existing) = slot.as_ref() {
            if existing.config() == &config {
                return Ok(Arc::clone(existing));
            }
            return Err(DomainError::new(
                ErrorCode::ChannelConflict,
                "A server event channel with a different configuration already exists",
            )
            .with_detail("existing_url", existing.config().url())
            .with_detail("requested_url", config.url()));
        }

        let channel = Arc::new(ServerEventChannel::new(config, Arc::clone(&self.connector)));
        self.bridge.register(&channel);
        tracing::debug!(url = channel.config().url(), "Server event channel created");

        *slot = Some(Arc::clone(&channel));
        Ok(channel)
    }

    /// The channel, if one was created.
    pub fn existing_channel(&self) -> Option<Arc<ServerEventChannel>> {
        lock(&self.channel).clone()
    }

    /// The process-wide cross-context bus posting through `link`.
    ///
    /// Once created, every translated server event is relayed through it.
    /// Feeding incoming messages (`listen`/`receive`) is up to the caller,
    /// who owns the receiving end of the link.
    pub fn cross_context_bus(
        &self,
        link: Arc<dyn ContextLink>,
    ) -> Result<Arc<CrossContextEventBus<DomainEvent>>, DomainError> {
        let mut slot = lock(&self.cross_context);

        if let Some(existing) = slot.as_ref() {
            if existing.target() == link.target() {
                return Ok(Arc::clone(existing));
            }
            return Err(DomainError::new(
                ErrorCode::ContextConflict,
                "A cross-context event bus for another target already exists",
            )
            .with_detail("existing_target", existing.target().as_str())
            .with_detail("requested_target", link.target().as_str()));
        }

        let bus = Arc::new(CrossContextEventBus::new(link));
        let relay: Arc<dyn EventPublisher<DomainEvent>> = bus.clone();
        self.bridge.set_relay(Some(relay));
        tracing::debug!(context_target = %bus.target(), "Cross-context event bus created");

        *slot = Some(Arc::clone(&bus));
        Ok(bus)
    }

    /// Disconnects the channel, if any.
    pub fn shutdown(&self) {
        if let Some(channel) = self.existing_channel() {
            channel.disconnect();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
