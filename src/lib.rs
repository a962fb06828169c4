//! Server Events - real-time event delivery for the CMS admin console.
//!
//! This crate carries server-side change notifications from a persistent
//! socket to typed, subscribable domain events:
//!
//! ```text
//! socket frame → ServerEventChannel (JSON) → EventTranslator
//!              → change extractor → DomainEvent → EventBus → handlers
//!                                                  └→ CrossContextEventBus
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
