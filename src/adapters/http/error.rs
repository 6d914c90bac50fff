//! Error bodies and status mapping shared by the HTTP adapters.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::CallError;
use crate::domain::dispatch::EngineError;
use crate::ports::CallControlError;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("SERVICE_UNAVAILABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Maps a handler error to a status code and JSON body.
pub fn handle_call_error(e: CallError) -> Response {
    let (status, body) = match &e {
        CallError::Validation(_) | CallError::Engine(EngineError::InvalidContext(_)) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(e.to_string()))
        }
        CallError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            ErrorResponse::not_found("Call", id.as_str()),
        ),
        CallError::NotConfigured(_) | CallError::CallControl(CallControlError::NotConfigured(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::unavailable(e.to_string()))
        }
        CallError::CallControl(inner) if inner.is_retryable() => {
            (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::unavailable(e.to_string()))
        }
        CallError::CallControl(_) => (StatusCode::BAD_GATEWAY, ErrorResponse::upstream(e.to_string())),
        CallError::Engine(_) | CallError::Store(_) => {
            tracing::error!(error = %e, "Call handler failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::internal(e.to_string()),
            )
        }
    };

    (status, Json(body)).into_response()
}
