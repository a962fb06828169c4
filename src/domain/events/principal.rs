//! Principal domain: users, groups and roles under `/identity`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::change::{ChangeDomain, ChangeItem, DomainChange, NodePath};
use super::event::DomainEvent;
use super::wire::NodeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Group,
    Role,
}

/// Principal key as the server writes it: `user:system:su`, `role:cms.admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalKey {
    pub kind: PrincipalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_provider: Option<String>,
    pub id: String,
}

impl PrincipalKey {
    /// Derives the key from a path relative to `/identity`.
    ///
    /// `/<idp>/users/<id>` and `/<idp>/groups/<id>` name users and groups,
    /// `/roles/<id>` names a role. Other paths (an id provider itself,
    /// folders) have no key.
    pub fn from_path(path: &NodePath) -> Option<Self> {
        let segments: Vec<&str> = path.segments().collect();
        match segments.as_slice() {
            ["roles", id] => Some(Self {
                kind: PrincipalKind::Role,
                id_provider: None,
                id: (*id).to_string(),
            }),
            [id_provider, folder, id] => {
                let kind = match *folder {
                    "users" => PrincipalKind::User,
                    "groups" => PrincipalKind::Group,
                    _ => return None,
                };
                Some(Self {
                    kind,
                    id_provider: Some((*id_provider).to_string()),
                    id: (*id).to_string(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for PrincipalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PrincipalKind::User => "user",
            PrincipalKind::Group => "group",
            PrincipalKind::Role => "role",
        };
        match &self.id_provider {
            Some(id_provider) => write!(f, "{}:{}:{}", kind, id_provider, self.id),
            None => write!(f, "{}:{}", kind, self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalChangeItem {
    pub path: NodePath,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_key: Option<PrincipalKey>,
}

impl ChangeItem for PrincipalChangeItem {
    fn path(&self) -> &NodePath {
        &self.path
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

pub type PrincipalServerChange = DomainChange<PrincipalChangeItem>;

pub struct PrincipalDomain;

impl ChangeDomain for PrincipalDomain {
    const NAME: &'static str = "principal";
    const NAMESPACE: &'static str = "/identity";
    type Item = PrincipalChangeItem;

    fn build_item(node: &NodeRecord, path: NodePath) -> Self::Item {
        PrincipalChangeItem {
            principal_key: PrincipalKey::from_path(&path),
            path,
            branch: node.branch.clone(),
        }
    }

    fn into_event(change: PrincipalServerChange) -> DomainEvent {
        DomainEvent::Principal(change)
    }
}
