//! Server events domain.
//!
//! - `wire` - raw envelope and node records
//! - `change_type` / `change` - classification and per-domain extraction
//! - `content`, `principal`, `issue`, `layer` - node-backed domains
//! - `repository`, `application`, `task` - type-tagged domains
//! - `event` - the publishable `DomainEvent`
//! - `translator` - envelope routing

pub mod application;
pub mod change;
pub mod change_type;
pub mod content;
pub mod event;
pub mod issue;
pub mod layer;
pub mod principal;
pub mod repository;
pub mod task;
pub mod translator;
pub mod wire;

pub use application::{ApplicationEvent, ApplicationEventType};
pub use change::{extract, matches_domain, ChangeDomain, ChangeItem, DomainChange, NodePath};
pub use change_type::ChangeType;
pub use content::{ContentChangeItem, ContentDomain, ContentServerChange};
pub use event::{event_names, DomainEvent};
pub use issue::{IssueChangeItem, IssueDomain, IssueServerChange};
pub use layer::{LayerChangeItem, LayerDomain, LayerServerChange};
pub use principal::{PrincipalChangeItem, PrincipalDomain, PrincipalKey, PrincipalKind, PrincipalServerChange};
pub use repository::{RepositoryChangeItem, RepositoryEvent, RepositoryEventKind};
pub use task::{TaskEvent, TaskEventType, TaskInfo, TaskProgress, TaskState};
pub use translator::{EventTranslator, NodeEventParser, ServerEventParser};
pub use wire::{NodeRecord, WireEnvelope};
