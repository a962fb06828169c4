//! Content domain: nodes under `/content`.

use serde::{Deserialize, Serialize};

use super::change::{ChangeDomain, ChangeItem, DomainChange, NodePath};
use super::event::DomainEvent;
use super::wire::NodeRecord;

/// One changed content node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChangeItem {
    pub path: NodePath,
    pub branch: String,
    pub repo: String,
    pub content_id: String,
}

impl ChangeItem for ContentChangeItem {
    fn path(&self) -> &NodePath {
        &self.path
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

pub type ContentServerChange = DomainChange<ContentChangeItem>;

pub struct ContentDomain;

impl ChangeDomain for ContentDomain {
    const NAME: &'static str = "content";
    const NAMESPACE: &'static str = "/content";
    type Item = ContentChangeItem;

    fn build_item(node: &NodeRecord, path: NodePath) -> Self::Item {
        ContentChangeItem {
            path,
            branch: node.branch.clone(),
            repo: node.repo.clone(),
            content_id: node.id.clone(),
        }
    }

    fn into_event(change: ContentServerChange) -> DomainEvent {
        DomainEvent::Content(change)
    }
}
