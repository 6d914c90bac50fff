//! In-Memory Context Store Adapter
//!
//! Keeps conversation contexts in a process-local map.
//! Useful for testing, development and single-instance deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::dispatch::ConversationContext;
use crate::domain::foundation::CallId;
use crate::ports::{ContextStore, ContextStoreError};

/// In-memory storage for conversation contexts
#[derive(Debug, Clone, Default)]
pub struct InMemoryContextStore {
    contexts: Arc<RwLock<HashMap<CallId, ConversationContext>>>,
}

impl InMemoryContextStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored contexts (useful for tests)
    pub async fn clear(&self) {
        self.contexts.write().await.clear();
    }

    /// Get the number of stored contexts
    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.read().await.is_empty()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn load(&self, call_id: &CallId) -> Result<Option<ConversationContext>, ContextStoreError> {
        Ok(self.contexts.read().await.get(call_id).cloned())
    }

    async fn save(
        &self,
        call_id: &CallId,
        context: &ConversationContext,
    ) -> Result<(), ContextStoreError> {
        self.contexts
            .write()
            .await
            .insert(call_id.clone(), context.clone());
        Ok(())
    }

    async fn delete(&self, call_id: &CallId) -> Result<bool, ContextStoreError> {
        Ok(self.contexts.write().await.remove(call_id).is_some())
    }
}
