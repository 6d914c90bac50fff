//! Errors shared by the call handlers.

use thiserror::Error;

use crate::domain::dispatch::EngineError;
use crate::domain::foundation::{CallId, ValidationError};
use crate::ports::{CallControlError, ContextStoreError};

#[derive(Debug, Error)]
pub enum CallError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Context store failure: {0}")]
    Store(#[from] ContextStoreError),

    #[error("Call not found: {0}")]
    NotFound(CallId),

    #[error("Call control failure: {0}")]
    CallControl(#[from] CallControlError),

    #[error("Call control is not configured: {0}")]
    NotConfigured(String),
}

impl CallError {
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }

    /// True when the caller sent something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Engine(EngineError::InvalidContext(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_client_error() {
        let err: CallError = ValidationError::empty_field("driver_name").into();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Invalid request: Field 'driver_name' cannot be empty");
    }

    #[test]
    fn store_failure_is_not_client_error() {
        let err: CallError = ContextStoreError::IoError("disk full".to_string()).into();
        assert!(!err.is_client_error());
    }
}
