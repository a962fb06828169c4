//! Repository domain: `repository.*` events about whole repositories.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::change::DomainChange;
use super::change_type::ChangeType;
use super::wire::WireEnvelope;

/// Wire type prefix owned by repository events.
pub const REPOSITORY_EVENT_PREFIX: &str = "repository.";

/// Repository lifecycle step, including the restore steps the node change
/// table has no entry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryEventKind {
    Created,
    Updated,
    Deleted,
    RestoreInitialized,
    Restored,
    Unknown,
}

impl RepositoryEventKind {
    fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "created" => Self::Created,
            "updated" => Self::Updated,
            "deleted" => Self::Deleted,
            "restoreInitialized" => Self::RestoreInitialized,
            "restored" => Self::Restored,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryChangeItem {
    pub repository_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEvent {
    pub kind: RepositoryEventKind,
    pub change: DomainChange<RepositoryChangeItem>,
}

/// Parses a `repository.*` envelope.
///
/// The repository id comes from `data.id`; node batches fall back to the
/// distinct `repo` fields of their nodes. No id at all yields `None`.
pub fn parse(envelope: &WireEnvelope) -> Option<RepositoryEvent> {
    let suffix = envelope.event_type.strip_prefix(REPOSITORY_EVENT_PREFIX)?;

    let ids: Vec<String> = match envelope.data.get("id").and_then(JsonValue::as_str) {
        Some(id) if !id.is_empty() => vec![id.to_string()],
        _ => {
            let mut seen = HashSet::new();
            envelope
                .nodes()
                .into_iter()
                .map(|node| node.repo)
                .filter(|repo| !repo.is_empty() && seen.insert(repo.clone()))
                .collect()
        }
    };

    if ids.is_empty() {
        return None;
    }

    Some(RepositoryEvent {
        kind: RepositoryEventKind::from_suffix(suffix),
        change: DomainChange {
            change_type: ChangeType::from_event_type(&envelope.event_type),
            change_items: ids
                .into_iter()
                .map(|repository_id| RepositoryChangeItem { repository_id })
                .collect(),
            new_paths: None,
        },
    })
}
