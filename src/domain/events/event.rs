//! The publishable unit: a typed server event with a static bus name.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::NamedEvent;

use super::application::ApplicationEvent;
use super::content::ContentServerChange;
use super::issue::IssueServerChange;
use super::layer::LayerServerChange;
use super::principal::PrincipalServerChange;
use super::repository::RepositoryEvent;
use super::task::TaskEvent;

/// Bus keys, one per `DomainEvent` variant.
pub mod event_names {
    pub const CONTENT_SERVER_EVENT: &str = "ContentServerEvent";
    pub const PRINCIPAL_SERVER_EVENT: &str = "PrincipalServerEvent";
    pub const ISSUE_SERVER_EVENT: &str = "IssueServerEvent";
    pub const LAYER_SERVER_EVENT: &str = "LayerServerEvent";
    pub const REPOSITORY_EVENT: &str = "RepositoryEvent";
    pub const APPLICATION_EVENT: &str = "ApplicationEvent";
    pub const TASK_EVENT: &str = "TaskEvent";

    pub const ALL: [&str; 7] = [
        CONTENT_SERVER_EVENT,
        PRINCIPAL_SERVER_EVENT,
        ISSUE_SERVER_EVENT,
        LAYER_SERVER_EVENT,
        REPOSITORY_EVENT,
        APPLICATION_EVENT,
        TASK_EVENT,
    ];
}

/// A translated server event.
///
/// Serialized adjacently tagged (`{"name": ..., "payload": ...}`) so the
/// same shape crosses context boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "payload")]
pub enum DomainEvent {
    #[serde(rename = "ContentServerEvent")]
    Content(ContentServerChange),

    #[serde(rename = "PrincipalServerEvent")]
    Principal(PrincipalServerChange),

    #[serde(rename = "IssueServerEvent")]
    Issue(IssueServerChange),

    #[serde(rename = "LayerServerEvent")]
    Layer(LayerServerChange),

    #[serde(rename = "RepositoryEvent")]
    Repository(RepositoryEvent),

    #[serde(rename = "ApplicationEvent")]
    Application(ApplicationEvent),

    #[serde(rename = "TaskEvent")]
    Task(TaskEvent),
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::Content(_) => event_names::CONTENT_SERVER_EVENT,
            DomainEvent::Principal(_) => event_names::PRINCIPAL_SERVER_EVENT,
            DomainEvent::Issue(_) => event_names::ISSUE_SERVER_EVENT,
            DomainEvent::Layer(_) => event_names::LAYER_SERVER_EVENT,
            DomainEvent::Repository(_) => event_names::REPOSITORY_EVENT,
            DomainEvent::Application(_) => event_names::APPLICATION_EVENT,
            DomainEvent::Task(_) => event_names::TASK_EVENT,
        }
    }
}

impl NamedEvent for DomainEvent {
    fn event_name(&self) -> &'static str {
        self.name()
    }
}
