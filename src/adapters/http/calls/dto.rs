//! HTTP DTOs for call endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{CallKind, TriggerCallResult};
use crate::ports::CallRecord;

/// Request to place a check-in call.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerCallRequest {
    pub driver_name: String,
    pub load_number: String,
    /// E.164 number to dial. Omit for a browser web call.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Caller id to dial from. Defaults to the configured number.
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    pub call_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_type: Option<CallKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_status: Option<String>,
    /// Web calls only; the browser client joins with it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl From<TriggerCallResult> for CallResponse {
    fn from(result: TriggerCallResult) -> Self {
        Self {
            call_type: Some(result.kind),
            ..CallResponse::from(result.call)
        }
    }
}

impl From<CallRecord> for CallResponse {
    fn from(record: CallRecord) -> Self {
        Self {
            call_id: record.call_id,
            call_type: None,
            call_status: record.call_status,
            access_token: record.access_token,
        }
    }
}
