//! In-process context link over unbounded channels.

use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::ports::{ContextLink, ContextTarget, CrossContextMessage, TransportError};

/// `ContextLink` that posts serialized messages into a tokio channel.
///
/// Whoever owns the matching receiver feeds the values into the bus of the
/// target context (see `CrossContextEventBus::listen`).
#[derive(Debug, Clone)]
pub struct ChannelLink {
    target: ContextTarget,
    sender: mpsc::UnboundedSender<JsonValue>,
}

/// One side of a linked pair: the link that reaches the other side, and
/// the inbox the other side posts into.
#[derive(Debug)]
pub struct ContextEnd {
    pub link: ChannelLink,
    pub inbox: mpsc::UnboundedReceiver<JsonValue>,
}

impl ChannelLink {
    pub fn new(target: ContextTarget, sender: mpsc::UnboundedSender<JsonValue>) -> Self {
        Self { target, sender }
    }

    /// Creates two contexts, `a` and `b`, that can post to each other.
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> (ContextEnd, ContextEnd) {
        let (to_a, inbox_a) = mpsc::unbounded_channel();
        let (to_b, inbox_b) = mpsc::unbounded_channel();

        let end_a = ContextEnd {
            link: ChannelLink::new(ContextTarget::new(b), to_b),
            inbox: inbox_a,
        };
        let end_b = ContextEnd {
            link: ChannelLink::new(ContextTarget::new(a), to_a),
            inbox: inbox_b,
        };
        (end_a, end_b)
    }
}

impl ContextLink for ChannelLink {
    fn target(&self) -> &ContextTarget {
        &self.target
    }

    fn post(&self, message: &CrossContextMessage) -> Result<(), TransportError> {
        let value =
            serde_json::to_value(message).map_err(|e| TransportError::Send(e.to_string()))?;
        self.sender
            .send(value)
            .map_err(|_| TransportError::LinkClosed(self.target.to_string()))
    }
}
