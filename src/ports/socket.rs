//! Socket ports - Interface for the duplex transport under a connection channel.
//!
//! The channel owns reconnection and liveness; a connector only knows how
//! to open one socket, and a session only knows how to move text frames.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a socket transport.
///
/// These never escape the connection channel: they are logged, reported to
/// error listeners and recovered from through the reconnect cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Failed to send frame: {0}")]
    Send(String),

    #[error("Failed to receive frame: {0}")]
    Receive(String),

    #[error("Socket is not connected")]
    NotConnected,

    #[error("Context link closed: {0}")]
    LinkClosed(String),
}

/// Opens sockets.
///
/// # Example
///
/// ```ignore
/// let session = connector.open("wss://cms.example.com/admin/event", &["text".into()]).await?;
/// ```
#[async_trait]
pub trait SocketConnector: Send + Sync {
    /// Opens one socket speaking one of `protocols`.
    async fn open(
        &self,
        url: &str,
        protocols: &[String],
    ) -> Result<Box<dyn SocketSession>, TransportError>;
}

/// One open socket.
#[async_trait]
pub trait SocketSession: Send {
    /// Next text frame; `None` once the peer closed the socket.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;

    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Closes the socket. Errors while closing are not interesting.
    async fn close(&mut self);
}
