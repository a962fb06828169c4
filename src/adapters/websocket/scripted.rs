//! Scripted socket transport for tests.
//!
//! Every successful `open` creates a `ScriptedPeer`, the server side of
//! the socket, which the test drives by hand: push frames, inject errors,
//! close, and inspect what the client sent.
//!
//! # Example
//!
//! ```ignore
//! let connector = ScriptedConnector::new();
//! let channel = ConnectionChannel::new(config, Arc::new(connector.clone()));
//!
//! channel.connect();
//! let peer = connector.wait_for_peer(1).await;
//! peer.push(r#"{"type":"node.created","data":{"nodes":[]}}"#);
//! peer.close();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::ports::{SocketConnector, SocketSession, TransportError};

/// Connector whose sockets are driven by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<Mutex<ScriptState>>,
    opened: Arc<Notify>,
}

#[derive(Debug)]
struct ScriptState {
    accepting: bool,
    attempts: usize,
    peers: Vec<ScriptedPeer>,
    requests: Vec<(String, Vec<String>)>,
}

impl Default for ScriptState {
    fn default() -> Self {
        Self {
            accepting: true,
            attempts: 0,
            peers: Vec::new(),
            requests: Vec::new(),
        }
    }
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// When false, `open` fails with a connect error.
    pub fn set_accepting(&self, accepting: bool) {
        self.state().accepting = accepting;
    }

    /// Number of `open` calls so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }

    /// Number of sockets opened successfully.
    pub fn opened(&self) -> usize {
        self.state().peers.len()
    }

    /// Every `(url, protocols)` pair `open` was called with.
    pub fn requests(&self) -> Vec<(String, Vec<String>)> {
        self.state().requests.clone()
    }

    pub fn latest_peer(&self) -> Option<ScriptedPeer> {
        self.state().peers.last().cloned()
    }

    /// Waits until at least `count` sockets have been opened and returns
    /// the latest one.
    pub async fn wait_for_peer(&self, count: usize) -> ScriptedPeer {
        loop {
            let notified = self.opened.notified();
            {
                let state = self.state();
                if state.peers.len() >= count {
                    if let Some(peer) = state.peers.last() {
                        return peer.clone();
                    }
                }
            }
            notified.await;
        }
    }
}

#[async_trait]
impl SocketConnector for ScriptedConnector {
    async fn open(
        &self,
        url: &str,
        protocols: &[String],
    ) -> Result<Box<dyn SocketSession>, TransportError> {
        let session = {
            let mut state = self.state();
            state.attempts += 1;
            state.requests.push((url.to_string(), protocols.to_vec()));

            if !state.accepting {
                return Err(TransportError::Connect {
                    url: url.to_string(),
                    reason: "connection refused".into(),
                });
            }

            let (inbound, receiver) = mpsc::unbounded_channel();
            let peer = ScriptedPeer {
                inbound,
                sent: Arc::new(Mutex::new(Vec::new())),
                closed_by_client: Arc::new(AtomicBool::new(false)),
            };
            let session = ScriptedSession {
                inbound: receiver,
                sent: Arc::clone(&peer.sent),
                closed: Arc::clone(&peer.closed_by_client),
            };
            state.peers.push(peer);
            session
        };

        self.opened.notify_waiters();
        Ok(Box::new(session))
    }
}

#[derive(Debug)]
enum PeerSignal {
    Frame(String),
    Error(String),
    Close,
}

/// Server side of one scripted socket.
#[derive(Debug, Clone)]
pub struct ScriptedPeer {
    inbound: mpsc::UnboundedSender<PeerSignal>,
    sent: Arc<Mutex<Vec<String>>>,
    closed_by_client: Arc<AtomicBool>,
}

impl ScriptedPeer {
    /// Delivers a text frame to the client.
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.inbound.send(PeerSignal::Frame(text.into()));
    }

    /// Makes the client's next read fail.
    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.inbound.send(PeerSignal::Error(reason.into()));
    }

    /// Closes the socket from the server side.
    pub fn close(&self) {
        let _ = self.inbound.send(PeerSignal::Close);
    }

    /// Frames the client sent on this socket.
    pub fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

struct ScriptedSession {
    inbound: mpsc::UnboundedReceiver<PeerSignal>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl SocketSession for ScriptedSession {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        match self.inbound.recv().await? {
            PeerSignal::Frame(text) => Some(Ok(text)),
            PeerSignal::Error(reason) => Some(Err(TransportError::Receive(reason))),
            PeerSignal::Close => None,
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text);
        Ok(())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.inbound.close();
    }
}
