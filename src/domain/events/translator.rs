//! Routes a wire envelope to the parser of the domain that owns it.
//!
//! Dispatch order:
//! 1. `type == "application"` → application parser
//! 2. `type` starts with `repository.` → repository parser
//! 3. `type` starts with `task.` → task parser
//! 4. first registered node domain whose namespace holds any node path
//!
//! Anything else translates to `None`.

use std::marker::PhantomData;

use super::application::{self, APPLICATION_EVENT_TYPE};
use super::change::{extract, matches_domain, ChangeDomain};
use super::content::ContentDomain;
use super::event::DomainEvent;
use super::issue::IssueDomain;
use super::layer::LayerDomain;
use super::principal::PrincipalDomain;
use super::repository::{self, REPOSITORY_EVENT_PREFIX};
use super::task::{self, TASK_EVENT_PREFIX};
use super::wire::WireEnvelope;

/// Parser for envelopes recognised by their node paths.
pub trait ServerEventParser: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// True when this parser owns the envelope.
    fn is(&self, envelope: &WireEnvelope) -> bool;

    fn parse(&self, envelope: &WireEnvelope) -> Option<DomainEvent>;
}

/// `ServerEventParser` for any node-backed `ChangeDomain`.
pub struct NodeEventParser<D>(PhantomData<fn() -> D>);

impl<D> NodeEventParser<D> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<D> Default for NodeEventParser<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ChangeDomain> ServerEventParser for NodeEventParser<D> {
    fn name(&self) -> &'static str {
        D::NAME
    }

    fn is(&self, envelope: &WireEnvelope) -> bool {
        matches_domain::<D>(envelope)
    }

    fn parse(&self, envelope: &WireEnvelope) -> Option<DomainEvent> {
        extract::<D>(envelope).map(D::into_event)
    }
}

/// Stateless envelope router.
pub struct EventTranslator {
    parsers: Vec<Box<dyn ServerEventParser>>,
}

impl EventTranslator {
    /// Translator without node domains; only the type-tagged routes apply.
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Appends a node domain parser. Earlier registrations win.
    pub fn register(mut self, parser: Box<dyn ServerEventParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    pub fn translate(&self, envelope: &WireEnvelope) -> Option<DomainEvent> {
        let event_type = envelope.event_type.as_str();

        if event_type == APPLICATION_EVENT_TYPE {
            return application::parse(envelope).map(DomainEvent::Application);
        }
        if event_type.starts_with(REPOSITORY_EVENT_PREFIX) {
            return repository::parse(envelope).map(DomainEvent::Repository);
        }
        if event_type.starts_with(TASK_EVENT_PREFIX) {
            return task::parse(envelope).map(DomainEvent::Task);
        }

        let parser = self.parsers.iter().find(|parser| parser.is(envelope))?;
        tracing::trace!(
            parser = parser.name(),
            event_type = %envelope.event_type,
            "Routing server event"
        );
        parser.parse(envelope)
    }
}

impl Default for EventTranslator {
    /// Content, principal, issue and layer, in that order.
    fn default() -> Self {
        Self::empty()
            .register(Box::new(NodeEventParser::<ContentDomain>::new()))
            .register(Box::new(NodeEventParser::<PrincipalDomain>::new()))
            .register(Box::new(NodeEventParser::<IssueDomain>::new()))
            .register(Box::new(NodeEventParser::<LayerDomain>::new()))
    }
}
