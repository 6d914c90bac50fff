//! Call-control port for the voice-AI provider.
//!
//! Places outbound calls and fetches call records. The engine never calls
//! this directly; application handlers do.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Port for voice-AI call control (e.g., Retell).
#[async_trait]
pub trait CallControl: Send + Sync {
    /// Place an outbound phone call.
    async fn create_phone_call(&self, request: PhoneCallRequest)
        -> Result<CallRecord, CallControlError>;

    /// Create a browser-based web call. Needs no phone numbers.
    async fn create_web_call(&self, request: WebCallRequest) -> Result<CallRecord, CallControlError>;

    /// Fetch a call by provider id.
    async fn get_call(&self, call_id: &str) -> Result<CallRecord, CallControlError>;
}

/// Request to dial a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneCallRequest {
    pub agent_id: String,
    pub to_number: String,
    /// Caller id. Falls back to the adapter's configured number when `None`.
    pub from_number: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Request to open a web call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebCallRequest {
    pub agent_id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A call as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    pub agent_id: Option<String>,
    /// Provider status string, e.g. `registered`, `ongoing`, `ended`.
    pub call_status: Option<String>,
    /// Present for web calls only.
    pub access_token: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Errors from the call-control provider.
#[derive(Debug, thiserror::Error)]
pub enum CallControlError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication with call provider failed")]
    Authentication,

    #[error("Call not found: {0}")]
    NotFound(String),

    #[error("Call provider rate limit exceeded")]
    RateLimited,

    #[error("Call provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid response from call provider: {0}")]
    InvalidResponse(String),

    #[error("Call control is not configured: {0}")]
    NotConfigured(String),
}

impl CallControlError {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited => true,
            Self::Provider { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Call control used when no provider credentials are configured.
///
/// Every operation fails with `NotConfigured`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCallControl;

impl UnconfiguredCallControl {
    const REASON: &'static str = "no voice provider API key set";
}

#[async_trait]
impl CallControl for UnconfiguredCallControl {
    async fn create_phone_call(
        &self,
        _request: PhoneCallRequest,
    ) -> Result<CallRecord, CallControlError> {
        Err(CallControlError::NotConfigured(Self::REASON.to_string()))
    }

    async fn create_web_call(&self, _request: WebCallRequest) -> Result<CallRecord, CallControlError> {
        Err(CallControlError::NotConfigured(Self::REASON.to_string()))
    }

    async fn get_call(&self, _call_id: &str) -> Result<CallRecord, CallControlError> {
        Err(CallControlError::NotConfigured(Self::REASON.to_string()))
    }
}
