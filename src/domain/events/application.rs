//! Application domain: installed application lifecycle.
//!
//! ```json
//! {"type": "application",
//!  "data": {"eventType": "STARTED", "applicationKey": "com.acme.app", "systemApplication": false}}
//! ```

use serde::{Deserialize, Serialize};

use super::wire::WireEnvelope;

/// Exact wire type of application events.
pub const APPLICATION_EVENT_TYPE: &str = "application";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationEventType {
    Installed,
    Uninstalled,
    Resolved,
    Starting,
    Started,
    Updated,
    Stopping,
    Stopped,
    Unresolved,
    #[serde(other)]
    Unknown,
}

impl ApplicationEventType {
    /// True for the lifecycle steps after which the application is usable.
    pub fn is_running(&self) -> bool {
        matches!(self, ApplicationEventType::Started | ApplicationEventType::Updated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEvent {
    pub event_type: ApplicationEventType,
    pub application_key: String,
    #[serde(default)]
    pub system_application: bool,
}

/// Parses an `application` envelope; a payload without key or event type
/// yields `None`.
pub fn parse(envelope: &WireEnvelope) -> Option<ApplicationEvent> {
    if envelope.event_type != APPLICATION_EVENT_TYPE {
        return None;
    }
    serde_json::from_value(envelope.data.clone()).ok()
}
