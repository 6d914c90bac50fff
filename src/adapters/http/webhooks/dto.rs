//! Response bodies for the Retell webhook.
//!
//! Field names follow what the Retell agent reads back: `response` is the
//! line to speak and `conversation_state` the engine state after the turn.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::application::{AnalyzeSpeechResult, ProcessTurnResult, StartCallResult};
use crate::domain::dispatch::{
    CallOutcome, ConversationState, CooperationLevel, EmergencyType, InformationGathered,
    Priority, ResponseTemplate,
};

/// Acknowledgement for events that need no reply.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

impl AckResponse {
    pub fn success() -> Self {
        Self { status: "success" }
    }
}

/// Reply to `call_started`.
#[derive(Debug, Clone, Serialize)]
pub struct CallStartedResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub response: String,
    pub conversation_state: ConversationState,
}

impl From<StartCallResult> for CallStartedResponse {
    fn from(result: StartCallResult) -> Self {
        Self {
            status: "success",
            message: "Call initialized with conversation guidance",
            response: result.greeting.message,
            conversation_state: result.context.state,
        }
    }
}

/// Reply to `agent_response_required`.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub response: String,
    pub conversation_state: ConversationState,
    pub follow_up_questions: Vec<String>,
    pub emergency_check: bool,
    pub priority: Priority,
    pub template: ResponseTemplate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<EmergencyType>,
}

impl From<ProcessTurnResult> for TurnResponse {
    fn from(result: ProcessTurnResult) -> Self {
        let decision = result.decision;
        Self {
            emergency_check: decision.is_critical(),
            response: decision.message,
            conversation_state: decision.state,
            follow_up_questions: decision.follow_up_questions,
            priority: decision.priority,
            template: decision.template,
            emergency_type: decision.emergency_type,
        }
    }
}

/// Reply to `user_speech`.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechAnalysisResponse {
    pub emergency_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<EmergencyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_analysis: Option<SpeechAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechAnalysis {
    pub unclear: bool,
    pub cooperation_level: CooperationLevel,
    pub information_provided: InformationGathered,
}

impl From<AnalyzeSpeechResult> for SpeechAnalysisResponse {
    fn from(result: AnalyzeSpeechResult) -> Self {
        let classification = result.classification;
        match classification.emergency {
            Some(emergency_type) => Self {
                emergency_detected: true,
                emergency_type: Some(emergency_type),
                speech_analysis: None,
            },
            None => Self {
                emergency_detected: false,
                emergency_type: None,
                speech_analysis: Some(SpeechAnalysis {
                    unclear: classification.unclear,
                    cooperation_level: classification.cooperation,
                    information_provided: classification.extracted,
                }),
            },
        }
    }
}

/// Reply to `call_ended`.
#[derive(Debug, Clone, Serialize)]
pub struct CallEndedResponse {
    pub call_id: String,
    pub status: &'static str,
    pub driver_name: String,
    pub load_number: String,
    pub transcript: String,
    /// Whole seconds.
    pub duration: i64,
    /// Absent when no conversation context was stored for the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CallOutcome>,
}

/// Reply to `call_analyzed`.
#[derive(Debug, Clone, Serialize)]
pub struct CallAnalyzedResponse {
    pub call_id: Option<String>,
    pub analysis: JsonValue,
    pub status: &'static str,
}
