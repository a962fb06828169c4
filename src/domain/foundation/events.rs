//! Event naming contract shared by every publishable event.
//!
//! Buses key their subscription registries by event name. Names are static
//! per event variant, so routing never depends on runtime type inspection.

/// Trait that all publishable events implement.
pub trait NamedEvent: Send + Sync + 'static {
    /// Returns the stable name used as the bus key (e.g. "ContentServerEvent").
    fn event_name(&self) -> &'static str;
}
