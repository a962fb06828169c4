//! Immutable connection configuration.

use std::time::Duration;

/// Default delay before a closed socket is reopened.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(5_000);

/// Default period between keep-alive probes.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_millis(30_000);

/// Extra time, on top of the reconnect interval, before a close counts as lost.
pub const DEFAULT_LIVENESS_GRACE: Duration = Duration::from_millis(1_000);

/// Sub-protocol the server events endpoint speaks.
pub const DEFAULT_PROTOCOL: &str = "text";

/// Configuration for one duplex connection.
///
/// Built once and handed to the channel, which never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    url: String,
    protocols: Vec<String>,
    reconnect_interval: Duration,
    keep_alive_interval: Duration,
    liveness_grace: Duration,
}

impl ConnectionConfig {
    /// Creates a config for `url` with default protocols and intervals.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocols: vec![DEFAULT_PROTOCOL.to_string()],
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            liveness_grace: DEFAULT_LIVENESS_GRACE,
        }
    }

    /// Creates a config for the server events endpoint below `base_url`.
    ///
    /// Returns `None` when `base_url` is neither `http://` nor `https://`.
    pub fn for_server_events(base_url: &str, event_path: &str) -> Option<Self> {
        server_events_url(base_url, event_path).map(Self::new)
    }

    pub fn with_protocols(mut self, protocols: Vec<String>) -> Self {
        self.protocols = protocols;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    pub fn with_liveness_grace(mut self, grace: Duration) -> Self {
        self.liveness_grace = grace;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    pub fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }

    pub fn keep_alive_interval(&self) -> Duration {
        self.keep_alive_interval
    }

    /// Delay between a close and the check that decides whether the
    /// connection is lost.
    pub fn liveness_check_delay(&self) -> Duration {
        self.reconnect_interval + self.liveness_grace
    }
}

/// Builds the socket URL for the server events endpoint.
///
/// `https` pages talk `wss`, everything else talks `ws`.
pub fn server_events_url(base_url: &str, event_path: &str) -> Option<String> {
    let (scheme, rest) = if let Some(rest) = base_url.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        ("ws", rest)
    } else {
        return None;
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return None;
    }

    let path = event_path.trim_start_matches('/');
    Some(format!("{scheme}://{rest}/{path}"))
}
