//! Socket transport adapters.
//!
//! - `TungsteniteConnector` - real WebSocket client
//! - `ScriptedConnector` - test transport driven by hand

mod scripted;
mod tungstenite;

pub use scripted::{ScriptedConnector, ScriptedPeer};
pub use tungstenite::TungsteniteConnector;
