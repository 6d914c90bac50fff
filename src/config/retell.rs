//! Retell voice-AI configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Retell configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetellSettings {
    /// API key; also the webhook signing key
    pub api_key: Option<SecretString>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Reject webhooks without a valid `x-retell-signature`
    #[serde(default)]
    pub verify_webhooks: bool,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Agent used for outbound calls when the request names none
    pub default_agent_id: Option<String>,

    /// Caller id for outbound phone calls
    pub from_number: Option<String>,
}

impl RetellSettings {
    /// True when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }

    /// Key for checking webhook signatures, when verification is on.
    ///
    /// `validate` guarantees a key whenever `verify_webhooks` is set.
    pub fn webhook_signing_key(&self) -> Option<&SecretString> {
        if !self.verify_webhooks {
            return None;
        }
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Retell configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.verify_webhooks && !self.is_configured() {
            return Err(ValidationError::MissingRequired("RETELL__API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidRetellUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for RetellSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            verify_webhooks: false,
            timeout_secs: default_timeout(),
            default_agent_id: None,
            from_number: None,
        }
    }
}

fn default_base_url() -> String {
    crate::adapters::retell::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}
