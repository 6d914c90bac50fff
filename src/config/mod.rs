//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `DISPATCH` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use dispatch_checkin::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod error;
mod monitor;
mod retell;
mod server;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use monitor::{EngineConfig, MonitorConfig};
pub use retell::RetellSettings;
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development setup with in-memory storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversation context storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Retell voice-AI integration
    #[serde(default)]
    pub retell: RetellSettings,

    /// Live monitor fan-out
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Conversation engine
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DISPATCH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DISPATCH__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DISPATCH__STORAGE__BACKEND=postgres` -> `storage.backend = postgres`
    /// - `DISPATCH__RETELL__VERIFY_WEBHOOKS=true` -> `retell.verify_webhooks = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DISPATCH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.retell.validate()?;
        self.monitor.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
