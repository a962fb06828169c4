//! Layer domain: content layers under `/layers`.

use serde::{Deserialize, Serialize};

use super::change::{ChangeDomain, ChangeItem, DomainChange, NodePath};
use super::event::DomainEvent;
use super::wire::NodeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerChangeItem {
    pub path: NodePath,
    pub branch: String,
    /// First path segment; absent for the namespace root itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

impl ChangeItem for LayerChangeItem {
    fn path(&self) -> &NodePath {
        &self.path
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

pub type LayerServerChange = DomainChange<LayerChangeItem>;

pub struct LayerDomain;

impl ChangeDomain for LayerDomain {
    const NAME: &'static str = "layer";
    const NAMESPACE: &'static str = "/layers";
    type Item = LayerChangeItem;

    fn build_item(node: &NodeRecord, path: NodePath) -> Self::Item {
        let layer = path.segments().next().map(str::to_string);
        LayerChangeItem {
            layer,
            path,
            branch: node.branch.clone(),
        }
    }

    fn into_event(change: LayerServerChange) -> DomainEvent {
        DomainEvent::Layer(change)
    }
}
