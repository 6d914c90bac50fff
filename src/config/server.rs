//! HTTP server settings

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Longest request the webhook endpoint may take before it is cut off.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Where and how the webhook server listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-request timeout; the voice agent waits on every turn
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated browser origins allowed to call the API.
    /// Unset means any origin.
    pub cors_origins: Option<String>,
}

/// Deployment environment. Production switches logs to JSON.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ValidationError::InvalidSocketAddr(addr))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Allowed CORS origins, or `None` when any origin is accepted.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        (!origins.is_empty()).then_some(origins)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info,dispatch_checkin=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8000_in_development() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8000");
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.is_production());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unparseable_host_fails_validation() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSocketAddr(_))
        ));
    }

    mod cors {
        use super::*;

        #[test]
        fn unset_allows_any_origin() {
            assert_eq!(ServerConfig::default().allowed_origins(), None);
        }

        #[test]
        fn splits_and_trims_list() {
            let config = ServerConfig {
                cors_origins: Some("https://dispatch.example.com, http://localhost:3000,".to_string()),
                ..Default::default()
            };
            assert_eq!(
                config.allowed_origins(),
                Some(vec![
                    "https://dispatch.example.com".to_string(),
                    "http://localhost:3000".to_string()
                ])
            );
        }

        #[test]
        fn blank_list_allows_any_origin() {
            let config = ServerConfig {
                cors_origins: Some(" , ".to_string()),
                ..Default::default()
            };
            assert_eq!(config.allowed_origins(), None);
        }
    }

    #[test]
    fn rejects_port_zero_and_out_of_range_timeouts() {
        let zero_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(zero_port.validate(), Err(ValidationError::InvalidPort));

        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }
}
