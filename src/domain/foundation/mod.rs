//! Foundation module - Shared domain primitives.
//!
//! Contains the error types, event naming contract, state machine trait and
//! timestamp value object used across the server events pipeline.

mod errors;
mod events;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::NamedEvent;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
