//! Wire envelope: the untyped JSON contract between server and client.
//!
//! ```json
//! {"type": "node.moved", "data": {"nodes": [
//!     {"id": "abc", "path": "/content/a", "newPath": "/content/b",
//!      "branch": "draft", "repo": "com.enonic.cms.default"}
//! ]}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One raw server event as received on the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// Type tag, e.g. `node.created`, `application`, `task.finished`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event payload; node events carry a `nodes` array.
    #[serde(default)]
    pub data: JsonValue,
}

impl WireEnvelope {
    pub fn new(event_type: impl Into<String>, data: JsonValue) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Reads an envelope out of an already parsed JSON value.
    ///
    /// Returns `None` when the value has no string `type` field.
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        let event_type = value.get("type")?.as_str()?;
        let data = value.get("data").cloned().unwrap_or(JsonValue::Null);
        Some(Self::new(event_type, data))
    }

    /// Node records carried in `data.nodes`.
    ///
    /// Entries that are not node objects are skipped, so a partially
    /// malformed batch still yields its readable records.
    pub fn nodes(&self) -> Vec<NodeRecord> {
        self.data
            .get("nodes")
            .and_then(JsonValue::as_array)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(|node| serde_json::from_value(node.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Text after the first `.` of the type tag (`task.finished` → `finished`).
    pub fn type_suffix(&self) -> &str {
        self.event_type
            .split_once('.')
            .map(|(_, suffix)| suffix)
            .unwrap_or(&self.event_type)
    }
}

/// One changed node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub path: String,

    /// Present for moves and renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,

    #[serde(default)]
    pub branch: String,

    #[serde(default)]
    pub repo: String,
}
