//! PostgreSQL implementation of ContextStore.
//!
//! Contexts are stored as JSONB, one row per call, upserted on every save.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::domain::dispatch::ConversationContext;
use crate::domain::foundation::CallId;
use crate::ports::{ContextStore, ContextStoreError};

/// PostgreSQL implementation of ContextStore.
#[derive(Clone)]
pub struct PostgresContextStore {
    pool: PgPool,
}

impl PostgresContextStore {
    /// Creates a new PostgresContextStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool and wraps it.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, ContextStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| ContextStoreError::DatabaseError(format!("Failed to connect: {}", e)))?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), ContextStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ContextStoreError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

#[async_trait]
impl ContextStore for PostgresContextStore {
    async fn load(&self, call_id: &CallId) -> Result<Option<ConversationContext>, ContextStoreError> {
        let row = sqlx::query(
            r#"
            SELECT context
            FROM conversation_contexts
            WHERE call_id = $1
            "#,
        )
        .bind(call_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ContextStoreError::DatabaseError(format!("Failed to fetch context: {}", e)))?;

        match row {
            Some(row) => {
                let value: serde_json::Value = row.try_get("context").map_err(|e| {
                    ContextStoreError::DatabaseError(format!("Failed to read context column: {}", e))
                })?;
                let context = serde_json::from_value(value)
                    .map_err(|e| ContextStoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(context))
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        call_id: &CallId,
        context: &ConversationContext,
    ) -> Result<(), ContextStoreError> {
        let value = serde_json::to_value(context)
            .map_err(|e| ContextStoreError::SerializationFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO conversation_contexts (call_id, context, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (call_id) DO UPDATE SET
                context = EXCLUDED.context,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(call_id.as_str())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| ContextStoreError::DatabaseError(format!("Failed to save context: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, call_id: &CallId) -> Result<bool, ContextStoreError> {
        let result = sqlx::query("DELETE FROM conversation_contexts WHERE call_id = $1")
            .bind(call_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                ContextStoreError::DatabaseError(format!("Failed to delete context: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
