//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the pipeline to external systems:
//! - `events` - Event bus implementations (in-memory, cross-context)
//! - `websocket` - Socket transports (tungstenite, scripted)

pub mod events;
pub mod websocket;

pub use events::{ChannelLink, ContextEnd, CrossContextEventBus, InMemoryEventBus};
pub use websocket::{ScriptedConnector, ScriptedPeer, TungsteniteConnector};
