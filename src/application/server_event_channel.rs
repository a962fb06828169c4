//! Server events connection.
//!
//! A `ConnectionChannel` whose frames are JSON server events. Each frame is
//! parsed, translated and handed to exactly one listener group:
//!
//! | frame                                   | listeners                |
//! |-----------------------------------------|--------------------------|
//! | translates to a `DomainEvent`           | `on_server_event`        |
//! | valid JSON, no parser claims it         | `on_unknown_server_event`|
//! | not JSON at all                         | `on_malformed_frame`     |
//!
//! Frames are handled synchronously in arrival order.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::connection_channel::{
    ConnectionChannel, ConnectionErrorListener, ConnectionListener,
};
use super::listeners::Listeners;
use crate::domain::connection::{ConnectionConfig, ConnectionState};
use crate::domain::events::{DomainEvent, EventTranslator, WireEnvelope};
use crate::domain::foundation::Timestamp;
use crate::ports::{SocketConnector, TransportError};

/// A frame that was valid JSON but matched no event parser.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownServerEvent {
    pub raw: JsonValue,
    pub received_at: Timestamp,
}

impl UnknownServerEvent {
    /// Wire type tag, when the frame had one.
    pub fn event_type(&self) -> Option<&str> {
        self.raw.get("type").and_then(JsonValue::as_str)
    }
}

/// A frame that was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedFrame {
    pub text: String,
    pub error: String,
    pub received_at: Timestamp,
}

pub type ServerEventListener = dyn Fn(&Arc<DomainEvent>) + Send + Sync;
pub type UnknownServerEventListener = dyn Fn(&UnknownServerEvent) + Send + Sync;
pub type MalformedFrameListener = dyn Fn(&MalformedFrame) + Send + Sync;

/// Connection to the server events endpoint.
///
/// # Example
///
/// ```ignore
/// let channel = ServerEventChannel::from_base_url(
///     "https://cms.example.com/admin",
///     "event",
///     Arc::new(TungsteniteConnector::new()),
/// )?;
/// channel.on_server_event(|event| tracing::info!(name = event.name(), "server event"));
/// channel.connect();
/// ```
pub struct ServerEventChannel {
    channel: ConnectionChannel,
    router: Arc<FrameRouter>,
}

struct FrameRouter {
    translator: EventTranslator,
    server_events: Listeners<ServerEventListener>,
    unknown: Listeners<UnknownServerEventListener>,
    malformed: Listeners<MalformedFrameListener>,
}

impl FrameRouter {
    fn route(&self, frame: &str) {
        let value: JsonValue = match serde_json::from_str(frame) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(error = %error, len = frame.len(), "Malformed server event frame");
                let malformed = MalformedFrame {
                    text: frame.to_string(),
                    error: error.to_string(),
                    received_at: Timestamp::now(),
                };
                self.malformed
                    .notify("malformed_frame", |listener| listener(&malformed));
                return;
            }
        };

        let event = WireEnvelope::from_value(&value)
            .and_then(|envelope| self.translator.translate(&envelope));

        match event {
            Some(event) => {
                tracing::debug!(event = event.name(), "Server event");
                let event = Arc::new(event);
                self.server_events
                    .notify("server_event", |listener| listener(&event));
            }
            None => {
                let unknown = UnknownServerEvent {
                    raw: value,
                    received_at: Timestamp::now(),
                };
                tracing::info!(
                    event_type = unknown.event_type().unwrap_or("<none>"),
                    "Unknown server event"
                );
                self.unknown
                    .notify("unknown_server_event", |listener| listener(&unknown));
            }
        }
    }
}

impl ServerEventChannel {
    pub fn new(config: ConnectionConfig, connector: Arc<dyn SocketConnector>) -> Self {
        Self::with_translator(config, connector, EventTranslator::default())
    }

    pub fn with_translator(
        config: ConnectionConfig,
        connector: Arc<dyn SocketConnector>,
        translator: EventTranslator,
    ) -> Self {
        let channel = ConnectionChannel::new(config, connector);
        let router = Arc::new(FrameRouter {
            translator,
            server_events: Listeners::new(),
            unknown: Listeners::new(),
            malformed: Listeners::new(),
        });

        let frames = Arc::clone(&router);
        channel.on_message(move |frame| frames.route(frame));

        Self { channel, router }
    }

    /// Channel for `<base_url>/<event_path>`, `https` becoming `wss` and
    /// anything else `ws`. `None` if `base_url` is not an http(s) URL.
    pub fn from_base_url(
        base_url: &str,
        event_path: &str,
        connector: Arc<dyn SocketConnector>,
    ) -> Option<Self> {
        ConnectionConfig::for_server_events(base_url, event_path)
            .map(|config| Self::new(config, connector))
    }

    pub fn connect(&self) {
        self.channel.connect();
    }

    pub fn disconnect(&self) {
        self.channel.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.channel.state()
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.channel.config()
    }

    /// Underlying connection, for raw frame or error listeners.
    pub fn connection(&self) -> &ConnectionChannel {
        &self.channel
    }

    pub fn on_server_event(
        &self,
        listener: impl Fn(&Arc<DomainEvent>) + Send + Sync + 'static,
    ) -> Arc<ServerEventListener> {
        let listener: Arc<ServerEventListener> = Arc::new(listener);
        self.add_server_event_listener(Arc::clone(&listener));
        listener
    }

    pub fn add_server_event_listener(&self, listener: Arc<ServerEventListener>) {
        self.router.server_events.add(listener);
    }

    pub fn un_server_event(&self, listener: &Arc<ServerEventListener>) -> bool {
        self.router.server_events.remove(listener)
    }

    pub fn on_unknown_server_event(
        &self,
        listener: impl Fn(&UnknownServerEvent) + Send + Sync + 'static,
    ) -> Arc<UnknownServerEventListener> {
        let listener: Arc<UnknownServerEventListener> = Arc::new(listener);
        self.router.unknown.add(Arc::clone(&listener));
        listener
    }

    pub fn un_unknown_server_event(&self, listener: &Arc<UnknownServerEventListener>) -> bool {
        self.router.unknown.remove(listener)
    }

    pub fn on_malformed_frame(
        &self,
        listener: impl Fn(&MalformedFrame) + Send + Sync + 'static,
    ) -> Arc<MalformedFrameListener> {
        let listener: Arc<MalformedFrameListener> = Arc::new(listener);
        self.router.malformed.add(Arc::clone(&listener));
        listener
    }

    pub fn un_malformed_frame(&self, listener: &Arc<MalformedFrameListener>) -> bool {
        self.router.malformed.remove(listener)
    }

    /// Fires when the connection is declared lost.
    pub fn on_connection_lost(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Arc<ConnectionListener> {
        self.channel.on_disconnected(listener)
    }

    pub fn un_connection_lost(&self, listener: &Arc<ConnectionListener>) -> bool {
        self.channel.un_disconnected(listener)
    }

    /// Fires when the connection is established or restored.
    pub fn on_connection_restored(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Arc<ConnectionListener> {
        self.channel.on_connected(listener)
    }

    pub fn un_connection_restored(&self, listener: &Arc<ConnectionListener>) -> bool {
        self.channel.un_connected(listener)
    }

    pub fn on_connection_error(
        &self,
        listener: impl Fn(&TransportError) + Send + Sync + 'static,
    ) -> Arc<ConnectionErrorListener> {
        self.channel.on_connection_error(listener)
    }

    pub fn un_connection_error(&self, listener: &Arc<ConnectionErrorListener>) -> bool {
        self.channel.un_connection_error(listener)
    }
}
