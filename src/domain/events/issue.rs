//! Issue domain: publish requests and tasks under `/issue`.

use serde::{Deserialize, Serialize};

use super::change::{ChangeDomain, ChangeItem, DomainChange, NodePath};
use super::event::DomainEvent;
use super::wire::NodeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueChangeItem {
    pub path: NodePath,
    pub branch: String,
    pub issue_id: String,
}

impl ChangeItem for IssueChangeItem {
    fn path(&self) -> &NodePath {
        &self.path
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

pub type IssueServerChange = DomainChange<IssueChangeItem>;

pub struct IssueDomain;

impl ChangeDomain for IssueDomain {
    const NAME: &'static str = "issue";
    const NAMESPACE: &'static str = "/issue";
    type Item = IssueChangeItem;

    fn build_item(node: &NodeRecord, path: NodePath) -> Self::Item {
        IssueChangeItem {
            path,
            branch: node.branch.clone(),
            issue_id: node.id.clone(),
        }
    }

    fn into_event(change: IssueServerChange) -> DomainEvent {
        DomainEvent::Issue(change)
    }
}
