//! Cross-context event bus.
//!
//! Fired events are serialized and posted through a `ContextLink` instead of
//! being dispatched in place. The receiving context feeds incoming messages
//! into its own bus with `receive` (or `listen`), which deserializes them
//! and dispatches to local handlers.
//!
//! Every bus stamps its messages with a random origin id and drops incoming
//! messages carrying its own id, so a link that loops back into the sending
//! context never triggers a second delivery.

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::InMemoryEventBus;
use crate::domain::foundation::NamedEvent;
use crate::ports::{
    ContextLink, ContextTarget, CrossContextMessage, EventHandler, EventPublisher,
    EventSubscriber, Subscription, SubscriptionHandle,
};

pub struct CrossContextEventBus<E> {
    origin: String,
    link: Arc<dyn ContextLink>,
    local: InMemoryEventBus<E>,
    _event: PhantomData<fn() -> E>,
}

impl<E> CrossContextEventBus<E>
where
    E: NamedEvent + Serialize + DeserializeOwned,
{
    pub fn new(link: Arc<dyn ContextLink>) -> Self {
        Self {
            origin: Uuid::new_v4().to_string(),
            link,
            local: InMemoryEventBus::new(),
            _event: PhantomData,
        }
    }

    /// Context this bus posts to.
    pub fn target(&self) -> &ContextTarget {
        self.link.target()
    }

    /// Origin id stamped on outgoing messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Handles one raw incoming message.
    ///
    /// Returns `true` when the message was dispatched to local handlers.
    /// Messages without `eventName`, echoes of this bus's own messages,
    /// details that do not deserialize and details whose own event name
    /// differs from `eventName` are ignored.
    pub fn receive(&self, raw: &JsonValue) -> bool {
        if raw.get("eventName").and_then(JsonValue::as_str).is_none() {
            return false;
        }

        let message: CrossContextMessage = match serde_json::from_value(raw.clone()) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(error = %error, "Ignoring malformed cross-context message");
                return false;
            }
        };

        if message.origin.as_deref() == Some(self.origin.as_str()) {
            tracing::debug!(
                event = %message.event_name,
                "Dropping echo of own cross-context message"
            );
            return false;
        }

        let event: E = match serde_json::from_value(message.detail) {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(
                    event = %message.event_name,
                    error = %error,
                    "Cross-context event detail did not deserialize"
                );
                return false;
            }
        };

        if event.event_name() != message.event_name {
            tracing::warn!(
                event = %message.event_name,
                detail_event = event.event_name(),
                "Cross-context event name does not match its detail"
            );
            return false;
        }

        self.local.dispatch(&message.event_name, Arc::new(event));
        true
    }

    /// Spawns a task feeding `inbox` into this bus until the inbox closes
    /// or the bus is dropped.
    pub fn listen(self: &Arc<Self>, mut inbox: mpsc::UnboundedReceiver<JsonValue>) -> JoinHandle<()> {
        let bus: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(raw) = inbox.recv().await {
                let Some(bus) = bus.upgrade() else {
                    break;
                };
                bus.receive(&raw);
            }
        })
    }
}

impl<E> EventPublisher<E> for CrossContextEventBus<E>
where
    E: NamedEvent + Serialize + DeserializeOwned,
{
    fn fire(&self, event: Arc<E>) {
        let event_name = event.event_name();

        let detail = match serde_json::to_value(event.as_ref()) {
            Ok(detail) => detail,
            Err(error) => {
                tracing::warn!(event = event_name, error = %error, "Event did not serialize");
                return;
            }
        };

        let message = CrossContextMessage {
            event_name: event_name.to_string(),
            detail,
            origin: Some(self.origin.clone()),
        };

        if let Err(error) = self.link.post(&message) {
            tracing::warn!(
                event = event_name,
                context_target = %self.link.target(),
                error = %error,
                "Failed to post cross-context event"
            );
        }
    }
}

impl<E> EventSubscriber<E> for CrossContextEventBus<E>
where
    E: NamedEvent + Serialize + DeserializeOwned,
{
    fn on(&self, event_name: &str, handler: Arc<dyn EventHandler<E>>) -> SubscriptionHandle {
        self.local.on(event_name, handler)
    }

    fn un(
        &self,
        event_name: &str,
        handler: Option<&Arc<dyn EventHandler<E>>>,
    ) -> Vec<Subscription<E>> {
        self.local.un(event_name, handler)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Option<Subscription<E>> {
        self.local.unsubscribe(handle)
    }
}
