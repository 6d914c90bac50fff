//! Context Store port - Interface for persisting conversation context.
//!
//! The engine holds nothing between turns, so the context must be saved
//! here before the next utterance for the same call is processed.
//! Otherwise the call regresses to its opening stage.

use async_trait::async_trait;

use crate::domain::dispatch::ConversationContext;
use crate::domain::foundation::CallId;

/// Errors that can occur during context store operations
#[derive(Debug, thiserror::Error)]
pub enum ContextStoreError {
    #[error("Failed to serialize context: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize context: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Port for loading and saving per-call conversation context
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Load the context for a call
    ///
    /// # Returns
    /// `None` if nothing has been saved for the call
    ///
    /// # Errors
    /// Returns `ContextStoreError` if the backend fails or the stored
    /// context cannot be decoded
    async fn load(&self, call_id: &CallId) -> Result<Option<ConversationContext>, ContextStoreError>;

    /// Save the context for a call, replacing any previous value
    ///
    /// # Errors
    /// Returns `ContextStoreError` if save fails
    async fn save(
        &self,
        call_id: &CallId,
        context: &ConversationContext,
    ) -> Result<(), ContextStoreError>;

    /// Delete the context for a call
    ///
    /// # Returns
    /// `true` if a context was removed
    async fn delete(&self, call_id: &CallId) -> Result<bool, ContextStoreError>;
}
