//! Classification of wire event types into change kinds.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// What happened to the nodes of one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Unknown,
    Publish,
    Duplicate,
    Create,
    Update,
    Delete,
    Pending,
    Rename,
    Sort,
    Move,
    UpdatePermissions,
}

/// Wire type suffix → change type. The only place the mapping lives.
static SUFFIX_TABLE: Lazy<HashMap<&'static str, ChangeType>> = Lazy::new(|| {
    HashMap::from([
        ("pushed", ChangeType::Publish),
        ("duplicated", ChangeType::Duplicate),
        ("created", ChangeType::Create),
        ("updated", ChangeType::Update),
        ("deleted", ChangeType::Delete),
        ("stateUpdated", ChangeType::Pending),
        ("renamed", ChangeType::Rename),
        ("sorted", ChangeType::Sort),
        ("moved", ChangeType::Move),
        ("permissionsUpdated", ChangeType::UpdatePermissions),
    ])
});

impl ChangeType {
    /// Classifies a wire type such as `node.moved` by the text after its
    /// last `.`. Anything not in the table is `Unknown`.
    pub fn from_event_type(event_type: &str) -> Self {
        let suffix = event_type
            .rsplit_once('.')
            .map(|(_, suffix)| suffix)
            .unwrap_or(event_type);

        SUFFIX_TABLE
            .get(suffix)
            .copied()
            .unwrap_or(ChangeType::Unknown)
    }

    /// Moves and renames report where the nodes ended up.
    pub fn carries_new_paths(&self) -> bool {
        matches!(self, ChangeType::Move | ChangeType::Rename)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Unknown => "UNKNOWN",
            ChangeType::Publish => "PUBLISH",
            ChangeType::Duplicate => "DUPLICATE",
            ChangeType::Create => "CREATE",
            ChangeType::Update => "UPDATE",
            ChangeType::Delete => "DELETE",
            ChangeType::Pending => "PENDING",
            ChangeType::Rename => "RENAME",
            ChangeType::Sort => "SORT",
            ChangeType::Move => "MOVE",
            ChangeType::UpdatePermissions => "UPDATE_PERMISSIONS",
        };
        write!(f, "{}", s)
    }
}
