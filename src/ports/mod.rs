//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the pipeline and the outside world. Adapters implement these ports.
//!
//! ## Transport Ports
//!
//! - `SocketConnector` / `SocketSession` - duplex socket under a channel
//! - `ContextLink` - message passing to another execution context
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for firing named events
//! - `EventSubscriber` - Port for registering handlers by event name
//! - `EventHandler` - Handler that processes fired events

mod context_link;
mod event_publisher;
mod event_subscriber;
mod socket;

pub use context_link::{ContextLink, ContextTarget, CrossContextMessage};
pub use event_publisher::EventPublisher;
pub use event_subscriber::{
    handler_fn, EventBus, EventHandler, EventSubscriber, FnHandler, Subscription,
    SubscriptionHandle,
};
pub use socket::{SocketConnector, SocketSession, TransportError};
