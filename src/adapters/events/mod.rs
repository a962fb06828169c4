//! Event bus adapters.
//!
//! Adapters implement the event publishing and subscribing ports
//! for different reaches:
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus
//! - `CrossContextEventBus` - Bus that posts events to another context
//! - `ChannelLink` - In-process link between two contexts

mod channel_link;
mod cross_context;
mod in_memory;

pub use channel_link::{ChannelLink, ContextEnd};
pub use cross_context::CrossContextEventBus;
pub use in_memory::InMemoryEventBus;
