//! Change extraction shared by every node-backed domain.
//!
//! A domain owns a path namespace (`/content`, `/identity`, ...). Extraction
//! keeps the nodes inside that namespace, strips the namespace from their
//! paths, classifies the wire type and builds one item per node:
//!
//! ```text
//! {"type":"node.renamed","data":{"nodes":[{"path":"/content/a","newPath":"/content/b",..}]}}
//!   → DomainChange { change_type: Rename, change_items: [path "/a"], new_paths: ["/b"] }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::change_type::ChangeType;
use super::event::DomainEvent;
use super::wire::{NodeRecord, WireEnvelope};

/// Node path relative to its domain namespace, always starting with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(String);

impl NodePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Strips `namespace` from `path` when the path lies inside it.
    ///
    /// Matching is segment-aware: `/content/a` and `/content` are inside
    /// `/content`, `/contents/a` is not. The namespace root becomes `/`.
    pub fn strip_namespace(path: &str, namespace: &str) -> Option<Self> {
        let rest = path.strip_prefix(namespace)?;
        if rest.is_empty() {
            Some(Self("/".to_string()))
        } else if rest.starts_with('/') {
            Some(Self(rest.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty path segments (`/a/b` → `["a", "b"]`).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Common view of one affected node.
pub trait ChangeItem {
    fn path(&self) -> &NodePath;
    fn branch(&self) -> &str;
}

/// Typed result of extracting one envelope for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainChange<I> {
    pub change_type: ChangeType,
    pub change_items: Vec<I>,

    /// Stripped destination paths; only set for moves and renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_paths: Option<Vec<NodePath>>,
}

impl<I> DomainChange<I> {
    pub fn len(&self) -> usize {
        self.change_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_items.is_empty()
    }
}

/// A node-backed domain: namespace, item shape and event wrapping.
pub trait ChangeDomain: 'static {
    /// Parser name used in logs.
    const NAME: &'static str;

    /// Path namespace owned by the domain, e.g. `/content`.
    const NAMESPACE: &'static str;

    type Item;

    /// Builds the domain item for a node already known to be in the namespace.
    fn build_item(node: &NodeRecord, path: NodePath) -> Self::Item;

    fn into_event(change: DomainChange<Self::Item>) -> DomainEvent;
}

/// True when any node of the envelope lies in the domain's namespace.
pub fn matches_domain<D: ChangeDomain>(envelope: &WireEnvelope) -> bool {
    envelope
        .nodes()
        .iter()
        .any(|node| NodePath::strip_namespace(&node.path, D::NAMESPACE).is_some())
}

/// Extracts the domain's change from an envelope.
///
/// Returns `None` when no node lies in the namespace; that envelope simply
/// belongs to someone else. Records repeating an earlier (path, branch)
/// pair are dropped.
pub fn extract<D: ChangeDomain>(envelope: &WireEnvelope) -> Option<DomainChange<D::Item>> {
    let nodes = envelope.nodes();
    let mut seen = HashSet::new();
    let unique: Vec<&NodeRecord> = nodes
        .iter()
        .filter(|node| seen.insert((node.path.as_str(), node.branch.as_str())))
        .collect();

    let change_items: Vec<D::Item> = unique
        .iter()
        .filter_map(|node| {
            NodePath::strip_namespace(&node.path, D::NAMESPACE)
                .map(|path| D::build_item(node, path))
        })
        .collect();

    if change_items.is_empty() {
        return None;
    }

    let change_type = ChangeType::from_event_type(&envelope.event_type);
    let new_paths = change_type.carries_new_paths().then(|| {
        unique
            .iter()
            .filter_map(|node| node.new_path.as_deref())
            .filter_map(|new_path| NodePath::strip_namespace(new_path, D::NAMESPACE))
            .collect()
    });

    Some(DomainChange {
        change_type,
        change_items,
        new_paths,
    })
}
