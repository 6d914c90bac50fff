//! Retell webhook payloads.
//!
//! Retell is loose about where it puts things: the call id may be at the
//! top level or inside `call`, and driver details may arrive as metadata or
//! as LLM dynamic variables. The accessors here look in every place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Inbound webhook body for `POST /api/webhooks/retell`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetellWebhook {
    pub event: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<RetellCallPayload>,

    #[serde(default)]
    pub metadata: Map<String, JsonValue>,

    /// Latest driver utterance (`agent_response_required`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_user_input: Option<String>,

    /// Utterance to analyze (`user_speech`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_speech: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// The `call` object embedded in lifecycle events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetellCallPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    #[serde(default)]
    pub metadata: Map<String, JsonValue>,

    #[serde(default)]
    pub retell_llm_dynamic_variables: Map<String, JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,

    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_analysis: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_analysis_data: Option<JsonValue>,
}

impl RetellCallPayload {
    /// Call length in whole seconds, when both timestamps are present.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.start_timestamp, self.end_timestamp) {
            (Some(start), Some(end)) if end > start => Some((end - start) / 1000),
            _ => None,
        }
    }
}

impl RetellWebhook {
    /// Top-level `call_id`, falling back to `call.call_id`.
    pub fn resolved_call_id(&self) -> Option<&str> {
        self.call_id
            .as_deref()
            .or_else(|| self.call.as_ref().and_then(|c| c.call_id.as_deref()))
            .filter(|id| !id.trim().is_empty())
    }

    /// Looks up a string value in metadata, then call metadata, then
    /// dynamic variables.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let call = self.call.as_ref();
        [
            Some(&self.metadata),
            call.map(|c| &c.metadata),
            call.map(|c| &c.retell_llm_dynamic_variables),
        ]
        .into_iter()
        .flatten()
        .find_map(|map| map.get(key).and_then(JsonValue::as_str))
        .filter(|value| !value.trim().is_empty())
    }

    pub fn driver_name(&self) -> Option<&str> {
        self.lookup("driver_name")
    }

    pub fn load_number(&self) -> Option<&str> {
        self.lookup("load_number")
    }

    pub fn scenario(&self) -> Option<&str> {
        self.lookup("scenario")
    }

    /// Utterance for speech analysis: `user_speech`, else `transcript`.
    pub fn speech(&self) -> &str {
        self.user_speech
            .as_deref()
            .or(self.transcript.as_deref())
            .unwrap_or_default()
    }

    /// Post-call analysis: `call_analysis`, else `custom_analysis_data`.
    pub fn analysis(&self) -> JsonValue {
        self.call
            .as_ref()
            .and_then(|c| c.call_analysis.clone().or_else(|| c.custom_analysis_data.clone()))
            .unwrap_or_else(|| JsonValue::Object(Map::new()))
    }
}
