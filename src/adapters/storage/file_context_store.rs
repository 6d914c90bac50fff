//! File-based Context Store Adapter
//!
//! Stores one YAML document per call under a base directory.
//! Files are human-readable, which helps when replaying a call by hand.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::dispatch::ConversationContext;
use crate::domain::foundation::CallId;
use crate::ports::{ContextStore, ContextStoreError};

/// File-based storage for conversation contexts
#[derive(Debug, Clone)]
pub struct FileContextStore {
    base_path: PathBuf,
}

impl FileContextStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileContextStore::new("./data/contexts");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the YAML file for a call.
    ///
    /// Provider ids are normally `[A-Za-z0-9_-]`; anything else is
    /// hex-encoded so an id can never escape the base directory.
    fn context_file_path(&self, call_id: &CallId) -> PathBuf {
        let raw = call_id.as_str();
        let safe = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        let stem = if safe {
            raw.to_string()
        } else {
            format!("~{}", hex::encode(raw))
        };
        self.base_path.join(format!("{}.yaml", stem))
    }

    async fn ensure_dir(&self) -> Result<(), ContextStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| ContextStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl ContextStore for FileContextStore {
    async fn load(&self, call_id: &CallId) -> Result<Option<ConversationContext>, ContextStoreError> {
        let file_path = self.context_file_path(call_id);

        let yaml = match fs::read_to_string(&file_path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ContextStoreError::IoError(e.to_string())),
        };

        let context = serde_yaml::from_str(&yaml)
            .map_err(|e| ContextStoreError::DeserializationFailed(e.to_string()))?;

        Ok(Some(context))
    }

    async fn save(
        &self,
        call_id: &CallId,
        context: &ConversationContext,
    ) -> Result<(), ContextStoreError> {
        self.ensure_dir().await?;

        let yaml = serde_yaml::to_string(context)
            .map_err(|e| ContextStoreError::SerializationFailed(e.to_string()))?;

        // Write then rename so a crash never leaves a half-written context
        let file_path = self.context_file_path(call_id);
        let tmp_path = file_path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml)
            .await
            .map_err(|e| ContextStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &file_path)
            .await
            .map_err(|e| ContextStoreError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, call_id: &CallId) -> Result<bool, ContextStoreError> {
        match fs::remove_file(self.context_file_path(call_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ContextStoreError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dispatch::{ConversationState, DriverStatus, EmergencyType};
    use tempfile::TempDir;

    fn call_id(id: &str) -> CallId {
        CallId::new(id).unwrap()
    }

    fn context() -> ConversationContext {
        let mut ctx = ConversationContext::new("Mike", "LD-4471").unwrap();
        ctx.state = ConversationState::EtaConfirmation;
        ctx.information_gathered.location = Some("I-10".to_string());
        ctx.information_gathered.driver_status = Some(DriverStatus::Driving);
        ctx
    }

    #[tokio::test]
    async fn save_and_load_context() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileContextStore::new(temp_dir.path());
        let id = call_id("call_3f9a");

        store.save(&id, &context()).await.unwrap();
        let loaded = store.load(&id).await.unwrap();

        assert_eq!(loaded, Some(context()));
        assert!(temp_dir.path().join("call_3f9a.yaml").exists());
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileContextStore::new(temp_dir.path().join("not-created-yet"));

        assert!(store.load(&call_id("call_1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn creates_base_directory_on_first_save() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("contexts");
        let store = FileContextStore::new(&base);

        store.save(&call_id("call_1"), &context()).await.unwrap();
        assert!(base.join("call_1.yaml").exists());
    }

    #[tokio::test]
    async fn emergency_context_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileContextStore::new(temp_dir.path());
        let mut ctx = context();
        ctx.state = ConversationState::EmergencyProtocol;
        ctx.emergency_detected = true;
        ctx.emergency_type = Some(EmergencyType::Breakdown);

        store.save(&call_id("call_1"), &ctx).await.unwrap();
        let loaded = store.load(&call_id("call_1")).await.unwrap().unwrap();
        assert_eq!(loaded.emergency_type, Some(EmergencyType::Breakdown));
        assert!(loaded.validate().is_ok());
    }

    #[tokio::test]
    async fn unsafe_ids_stay_inside_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("contexts");
        let store = FileContextStore::new(&base);
        let id = call_id("../escape");

        store.save(&id, &context()).await.unwrap();

        assert!(!temp_dir.path().join("escape.yaml").exists());
        let path = store.context_file_path(&id);
        assert_eq!(path.parent(), Some(base.as_path()));
        assert!(store.load(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_deserialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileContextStore::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("call_1.yaml"), "state: [not, a, state").unwrap();

        let result = store.load(&call_id("call_1")).await;
        assert!(matches!(result, Err(ContextStoreError::DeserializationFailed(_))));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileContextStore::new(temp_dir.path());
        let id = call_id("call_1");
        store.save(&id, &context()).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.load(&id).await.unwrap().is_none());
    }
}
