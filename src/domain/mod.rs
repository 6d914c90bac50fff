//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine trait)
//! - `dispatch` - Check-in conversation engine: classification, transitions, responses
//!
//! Nothing in this layer performs I/O.

pub mod dispatch;
pub mod foundation;
