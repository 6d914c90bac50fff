//! Retell REST client.
//!
//! Implements `CallControl` against the Retell v2 API. Authentication is a
//! bearer API key held as a `SecretString`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::ports::{CallControl, CallControlError, CallRecord, PhoneCallRequest, WebCallRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.retellai.com";

/// Retell API configuration.
#[derive(Clone)]
pub struct RetellConfig {
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
    /// Caller id used when a request names none.
    from_number: Option<String>,
}

impl RetellConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            from_number: None,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_from_number(mut self, number: Option<String>) -> Self {
        self.from_number = number.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

#[derive(Serialize)]
struct CreatePhoneCallBody<'a> {
    from_number: &'a str,
    to_number: &'a str,
    override_agent_id: &'a str,
    metadata: &'a HashMap<String, String>,
    retell_llm_dynamic_variables: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct CreateWebCallBody<'a> {
    agent_id: &'a str,
    metadata: &'a HashMap<String, String>,
    retell_llm_dynamic_variables: &'a HashMap<String, String>,
}

/// Call object as returned by Retell. Metadata values may be any JSON.
#[derive(Deserialize)]
struct RetellCallResponse {
    call_id: String,
    #[serde(default)]
    agent_id: Option<String>,
    #[serde(default)]
    call_status: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    metadata: Option<Map<String, JsonValue>>,
}

impl From<RetellCallResponse> for CallRecord {
    fn from(response: RetellCallResponse) -> Self {
        let metadata = response
            .metadata
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match value {
                JsonValue::String(s) => Some((key, s)),
                JsonValue::Null => None,
                other => Some((key, other.to_string())),
            })
            .collect();

        Self {
            call_id: response.call_id,
            agent_id: response.agent_id,
            call_status: response.call_status,
            access_token: response.access_token,
            metadata,
        }
    }
}

#[derive(Deserialize)]
struct PhoneNumberEntry {
    phone_number: String,
}

/// Retell call-control adapter.
pub struct RetellClient {
    config: RetellConfig,
    http_client: reqwest::Client,
}

impl RetellClient {
    pub fn new(config: RetellConfig) -> Result<Self, CallControlError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CallControlError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// `path` with `id` appended as one percent-encoded segment.
    fn resource_url(&self, path: &str, id: &str) -> Result<reqwest::Url, CallControlError> {
        let mut url = reqwest::Url::parse(&self.url(path))
            .map_err(|e| CallControlError::NotConfigured(format!("Retell base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| CallControlError::NotConfigured("Retell base URL cannot hold a path".to_string()))?
            .push(id);
        Ok(url)
    }

    /// Caller id for an outbound call: request, then config, then the
    /// first number on the account.
    async fn resolve_from_number(&self, requested: Option<String>) -> Result<String, CallControlError> {
        if let Some(number) = requested.filter(|n| !n.trim().is_empty()) {
            return Ok(number);
        }
        if let Some(number) = &self.config.from_number {
            return Ok(number.clone());
        }

        let response = self
            .http_client
            .get(self.url("/list-phone-numbers"))
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(network_error)?;

        let numbers: Vec<PhoneNumberEntry> = parse_response(response).await?;
        numbers
            .into_iter()
            .next()
            .map(|entry| entry.phone_number)
            .ok_or_else(|| {
                CallControlError::NotConfigured("no phone numbers on the Retell account".to_string())
            })
    }
}

#[async_trait]
impl CallControl for RetellClient {
    async fn create_phone_call(
        &self,
        request: PhoneCallRequest,
    ) -> Result<CallRecord, CallControlError> {
        let from_number = self.resolve_from_number(request.from_number.clone()).await?;

        let body = CreatePhoneCallBody {
            from_number: &from_number,
            to_number: &request.to_number,
            override_agent_id: &request.agent_id,
            metadata: &request.metadata,
            retell_llm_dynamic_variables: &request.metadata,
        };

        let response = self
            .http_client
            .post(self.url("/v2/create-phone-call"))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let call: RetellCallResponse = parse_response(response).await?;
        tracing::info!(call_id = %call.call_id, to = %request.to_number, "Retell phone call created");
        Ok(call.into())
    }

    async fn create_web_call(&self, request: WebCallRequest) -> Result<CallRecord, CallControlError> {
        let body = CreateWebCallBody {
            agent_id: &request.agent_id,
            metadata: &request.metadata,
            retell_llm_dynamic_variables: &request.metadata,
        };

        let response = self
            .http_client
            .post(self.url("/v2/create-web-call"))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let call: RetellCallResponse = parse_response(response).await?;
        tracing::info!(call_id = %call.call_id, "Retell web call created");
        Ok(call.into())
    }

    async fn get_call(&self, call_id: &str) -> Result<CallRecord, CallControlError> {
        if matches!(call_id, "." | "..") {
            return Err(CallControlError::NotFound(call_id.to_string()));
        }

        let response = self
            .http_client
            .get(self.resource_url("/v2/get-call", call_id)?)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CallControlError::NotFound(call_id.to_string()));
        }

        let call: RetellCallResponse = parse_response(response).await?;
        Ok(call.into())
    }
}

fn network_error(e: reqwest::Error) -> CallControlError {
    CallControlError::Network(e.to_string())
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CallControlError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| CallControlError::InvalidResponse(e.to_string()));
    }

    let message = response.text().await.unwrap_or_default();
    tracing::error!(status = status.as_u16(), body = %message, "Retell API error");

    Err(match status.as_u16() {
        401 | 403 => CallControlError::Authentication,
        404 => CallControlError::NotFound(message),
        429 => CallControlError::RateLimited,
        code => CallControlError::Provider {
            status: code,
            message,
        },
    })
}
