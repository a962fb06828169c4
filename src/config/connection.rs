//! Server events connection configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::connection::{
    ConnectionConfig, DEFAULT_KEEP_ALIVE_INTERVAL, DEFAULT_LIVENESS_GRACE, DEFAULT_PROTOCOL,
    DEFAULT_RECONNECT_INTERVAL,
};

/// Where and how to reach the server events endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSettings {
    /// Admin base URL (`http://` or `https://`)
    pub base_url: String,

    /// Endpoint path below the base URL
    #[serde(default = "default_event_path")]
    pub event_path: String,

    /// WebSocket sub-protocols (comma-separated in the environment)
    #[serde(default = "default_protocols")]
    pub protocols: Vec<String>,

    /// Delay before reopening a closed socket
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Period of the keep-alive frame
    #[serde(default = "default_keep_alive_interval_ms")]
    pub keep_alive_interval_ms: u64,

    /// Extra wait after the reconnect interval before declaring the
    /// connection lost
    #[serde(default = "default_liveness_grace_ms")]
    pub liveness_grace_ms: u64,
}

impl ConnectionSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            event_path: default_event_path(),
            protocols: default_protocols(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            keep_alive_interval_ms: default_keep_alive_interval_ms(),
            liveness_grace_ms: default_liveness_grace_ms(),
        }
    }

    /// Validate connection settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("connection.base_url"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.protocols.is_empty() || self.protocols.iter().any(|p| p.trim().is_empty()) {
            return Err(ValidationError::InvalidProtocols);
        }
        if self.reconnect_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval("reconnect_interval_ms"));
        }
        if self.keep_alive_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval("keep_alive_interval_ms"));
        }
        Ok(())
    }

    /// Socket URL and timings for the channel.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, ValidationError> {
        let config = ConnectionConfig::for_server_events(&self.base_url, &self.event_path)
            .ok_or(ValidationError::InvalidBaseUrl)?;

        Ok(config
            .with_protocols(self.protocols.iter().map(|p| p.trim().to_string()).collect())
            .with_reconnect_interval(Duration::from_millis(self.reconnect_interval_ms))
            .with_keep_alive_interval(Duration::from_millis(self.keep_alive_interval_ms))
            .with_liveness_grace(Duration::from_millis(self.liveness_grace_ms)))
    }
}

fn default_event_path() -> String {
    "event".to_string()
}

fn default_protocols() -> Vec<String> {
    vec![DEFAULT_PROTOCOL.to_string()]
}

fn default_reconnect_interval_ms() -> u64 {
    DEFAULT_RECONNECT_INTERVAL.as_millis() as u64
}

fn default_keep_alive_interval_ms() -> u64 {
    DEFAULT_KEEP_ALIVE_INTERVAL.as_millis() as u64
}

fn default_liveness_grace_ms() -> u64 {
    DEFAULT_LIVENESS_GRACE.as_millis() as u64
}
