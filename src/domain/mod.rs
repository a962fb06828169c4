//! Domain layer.
//!
//! - `foundation` - shared primitives (errors, state machines, timestamps)
//! - `connection` - connection configuration and lifecycle state
//! - `events` - wire envelopes, change extraction and typed domain events

pub mod connection;
pub mod events;
pub mod foundation;
