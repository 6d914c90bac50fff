//! Context storage configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which `ContextStore` adapter to run with.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
    Postgres,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Base directory for the file backend
    #[serde(default = "default_directory")]
    pub directory: String,

    /// PostgreSQL connection URL for the postgres backend
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
            StorageBackend::File => {
                if self.directory.trim().is_empty() {
                    return Err(ValidationError::MissingRequired("STORAGE__DIRECTORY"));
                }
                Ok(())
            }
            StorageBackend::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .filter(|url| !url.is_empty())
                    .ok_or(ValidationError::MissingRequired("STORAGE__DATABASE_URL"))?;
                if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                    return Err(ValidationError::InvalidDatabaseUrl);
                }
                if self.max_connections == 0 || self.max_connections > 100 {
                    return Err(ValidationError::InvalidPoolSize);
                }
                Ok(())
            }
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            directory: default_directory(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_directory() -> String {
    "./data/contexts".to_string()
}

fn default_max_connections() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres(url: Option<&str>) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Postgres,
            database_url: url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn memory_needs_nothing() {
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[test]
    fn file_needs_directory() {
        let config = StorageConfig {
            backend: StorageBackend::File,
            directory: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STORAGE__DIRECTORY"))
        );
    }

    #[test]
    fn postgres_needs_valid_url() {
        assert!(postgres(None).validate().is_err());
        assert_eq!(
            postgres(Some("mysql://localhost/db")).validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
        assert!(postgres(Some("postgres://localhost/dispatch")).validate().is_ok());
    }

    #[test]
    fn postgres_pool_bounds() {
        let mut config = postgres(Some("postgresql://localhost/dispatch"));
        config.max_connections = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPoolSize));
        config.max_connections = 101;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPoolSize));
    }
}
