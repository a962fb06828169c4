//! Connection domain: immutable configuration and lifecycle state.

mod config;
mod state;

pub use config::{
    server_events_url, ConnectionConfig, DEFAULT_KEEP_ALIVE_INTERVAL, DEFAULT_LIVENESS_GRACE,
    DEFAULT_PROTOCOL, DEFAULT_RECONNECT_INTERVAL,
};
pub use state::ConnectionState;
