//! WebSocket transport backed by `tokio-tungstenite`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::ports::{SocketConnector, SocketSession, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens real WebSocket connections (`ws://` and `wss://`).
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    async fn open(
        &self,
        url: &str,
        protocols: &[String],
    ) -> Result<Box<dyn SocketSession>, TransportError> {
        let connect_error = |reason: String| TransportError::Connect {
            url: url.to_string(),
            reason,
        };

        let mut request = url
            .into_client_request()
            .map_err(|e| connect_error(e.to_string()))?;

        if !protocols.is_empty() {
            let header = HeaderValue::from_str(&protocols.join(", "))
                .map_err(|e| connect_error(e.to_string()))?;
            request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, header);
        }

        let (stream, response) = connect_async(request)
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        tracing::debug!(
            url,
            status = %response.status(),
            protocol = ?response.headers().get(SEC_WEBSOCKET_PROTOCOL),
            "WebSocket handshake completed"
        );

        Ok(Box::new(TungsteniteSession { stream }))
    }
}

struct TungsteniteSession {
    stream: WsStream,
}

#[async_trait]
impl SocketSession for TungsteniteSession {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "Peer closed WebSocket");
                    return None;
                }
                // Ping/pong are answered by tungstenite; binary frames carry no events.
                Ok(_) => continue,
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::trace!(error = %e, "WebSocket close did not complete cleanly");
        }
    }
}
