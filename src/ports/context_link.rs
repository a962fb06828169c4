//! ContextLink port - Message passing to another execution context.
//!
//! A context (an embedded frame, a sibling process, a worker) that has no
//! server connection of its own receives events through a link. Delivery
//! is asynchronous and unordered relative to the sender's own code.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::socket::TransportError;

/// Identity of the context a link posts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextTarget(String);

impl ContextTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message posted across a context boundary.
///
/// Receivers only act on messages carrying `eventName`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossContextMessage {
    pub event_name: String,
    pub detail: JsonValue,
    /// Bus instance that posted the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Port for posting messages to another context.
pub trait ContextLink: Send + Sync {
    fn target(&self) -> &ContextTarget;

    /// Posts `message`; the receiving side delivers it later.
    fn post(&self, message: &CrossContextMessage) -> Result<(), TransportError>;
}
