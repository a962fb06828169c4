//! Application layer - Channels, the event bridge and the process context.
//!
//! - `ConnectionChannel` - reconnecting socket with liveness and keep-alive
//! - `ServerEventChannel` - JSON frame routing onto typed listeners
//! - `ServerEventsBridge` - republishes server events on the buses
//! - `ServerEventsContext` - owns the bus and the single channel

mod bridge;
mod connection_channel;
mod context;
mod listeners;
mod server_event_channel;

pub use bridge::ServerEventsBridge;
pub use connection_channel::{
    ConnectionChannel, ConnectionErrorListener, ConnectionListener, MessageListener,
    KEEP_ALIVE_FRAME,
};
pub use context::ServerEventsContext;
pub use listeners::Listeners;
pub use server_event_channel::{
    MalformedFrame, MalformedFrameListener, ServerEventChannel, ServerEventListener,
    UnknownServerEvent, UnknownServerEventListener,
};
