//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types and the state machine
//! trait used by the dispatch conversation engine.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{CallId, ClientId, EventId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
