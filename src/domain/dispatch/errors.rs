//! Engine error types.
//!
//! The engine only fails on caller-contract violations. Unclear speech,
//! uncooperative drivers and unknown statuses are handled by the state
//! machine and never surface here.

use thiserror::Error;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid conversation context: {0}")]
    InvalidContext(#[from] ValidationError),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
}
