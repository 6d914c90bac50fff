//! Response generator.
//!
//! Maps the post-transition context to what the voice agent says next.
//! Templates are static; only the driver name and load number vary.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::classifier::EmergencyType;
use super::context::ConversationContext;
use super::scenario::Scenario;
use super::state::ConversationState;
use super::transition::TransitionOutcome;

/// Urgency tag attached to every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    #[serde(rename = "CRITICAL")]
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies which canned response was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTemplate {
    Opening,
    GatheringStatus,
    GatheringStatusRetry,
    LocationUpdate,
    EtaConfirmation,
    Closing,
    Escalation,
    EmergencyProtocol,
    NoisyEnvironment,
    GatheringInfo,
}

const NO_FOLLOW_UPS: &[&str] = &[];

impl ResponseTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::GatheringStatus => "gathering_status",
            Self::GatheringStatusRetry => "gathering_status_retry",
            Self::LocationUpdate => "location_update",
            Self::EtaConfirmation => "eta_confirmation",
            Self::Closing => "closing",
            Self::Escalation => "escalation",
            Self::EmergencyProtocol => "emergency_protocol",
            Self::NoisyEnvironment => "noisy_environment",
            Self::GatheringInfo => "gathering_info",
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Self::EmergencyProtocol => Priority::Critical,
            Self::GatheringStatusRetry | Self::Escalation | Self::NoisyEnvironment => {
                Priority::High
            }
            _ => Priority::Normal,
        }
    }

    pub fn follow_up_questions(&self) -> &'static [&'static str] {
        match self {
            Self::Opening => &["What's your current status?", "Where are you right now?"],
            Self::GatheringStatus => &[
                "Where are you currently?",
                "Are you driving or have you arrived?",
            ],
            Self::GatheringStatusRetry => &["Just need to know if you're driving or arrived"],
            Self::LocationUpdate => &[
                "Which highway or mile marker?",
                "Are you at the pickup or delivery location?",
            ],
            Self::EtaConfirmation => &[
                "How much longer do you think?",
                "When should we expect completion?",
            ],
            Self::Closing | Self::Escalation => NO_FOLLOW_UPS,
            Self::EmergencyProtocol => &[
                "Are you safe?",
                "What's your exact location?",
                "Do you need emergency services?",
            ],
            Self::NoisyEnvironment => &["Can you speak louder?", "Are you in a noisy area?"],
            Self::GatheringInfo => &["What's your current status?"],
        }
    }

    /// Fills in the template for this driver and load.
    pub fn render(&self, context: &ConversationContext) -> String {
        let driver = &context.driver_name;
        let load = &context.load_number;
        match self {
            Self::Opening => format!(
                "Hi {driver}, this is dispatch with a check call on load {load}. \
                 Can you give me an update on your status?"
            ),
            Self::GatheringStatus => {
                "Thank you. Can you tell me your current location and status?".to_string()
            }
            Self::GatheringStatusRetry => format!(
                "I understand you might be busy {driver}, but I need a quick status update \
                 on load {load}. Are you driving, arrived, or delayed?"
            ),
            Self::LocationUpdate => {
                "What's your current location? Are you on the highway or at the destination?"
                    .to_string()
            }
            Self::EtaConfirmation => {
                "Great! What's your estimated time of arrival or completion?".to_string()
            }
            Self::Closing => format!(
                "Perfect! Thanks for the update {driver}. Drive safely and call if you need anything."
            ),
            Self::Escalation => format!(
                "{driver}, I'm going to connect you with a human dispatcher who can better \
                 assist you. Please hold on."
            ),
            Self::EmergencyProtocol => {
                emergency_message(context.emergency_type.unwrap_or(EmergencyType::General), driver)
            }
            Self::NoisyEnvironment => format!(
                "I'm having trouble hearing you clearly, {driver}. There might be background \
                 noise. Can you speak louder or move to a quieter area? If this continues, \
                 I'll connect you with a human dispatcher."
            ),
            Self::GatheringInfo => {
                "I understand. Can you provide more details about your current situation?"
                    .to_string()
            }
        }
    }
}

impl fmt::Display for ResponseTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn emergency_message(kind: EmergencyType, driver: &str) -> String {
    match kind {
        EmergencyType::Accident => format!(
            "I understand there's been an accident, {driver}. First, are you safe? \
             Are you injured? Is anyone else involved?"
        ),
        EmergencyType::Breakdown => format!(
            "I hear you're having vehicle trouble, {driver}. Are you safe? \
             Are you in a safe location off the road?"
        ),
        EmergencyType::Medical => format!(
            "This sounds like a medical emergency, {driver}. Are you conscious and able \
             to speak? Do you need me to call 911?"
        ),
        EmergencyType::General => format!(
            "I understand this is an emergency situation, {driver}. First priority - \
             are you safe? Tell me what's happening."
        ),
    }
}

/// What the voice agent should do after one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDecision {
    pub message: String,
    pub state: ConversationState,
    pub template: ResponseTemplate,
    pub follow_up_questions: Vec<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<EmergencyType>,
}

impl TurnDecision {
    pub fn is_critical(&self) -> bool {
        self.priority == Priority::Critical
    }
}

/// Picks and renders the response for a context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseGenerator;

impl ResponseGenerator {
    /// Chooses the template for the turn that produced `context`.
    pub fn select(
        &self,
        context: &ConversationContext,
        outcome: TransitionOutcome,
        scenario: &Scenario,
    ) -> ResponseTemplate {
        if outcome == TransitionOutcome::NoisyEnvironment {
            return ResponseTemplate::NoisyEnvironment;
        }
        if !scenario.is_recognized() && !context.state.is_terminal() {
            return ResponseTemplate::GatheringInfo;
        }
        self.for_state(context)
    }

    /// Canonical template for the context's current state.
    pub fn for_state(&self, context: &ConversationContext) -> ResponseTemplate {
        match context.state {
            ConversationState::Opening => ResponseTemplate::Opening,
            ConversationState::GatheringStatus if context.cooperation_level.is_resistant() => {
                ResponseTemplate::GatheringStatusRetry
            }
            ConversationState::GatheringStatus => ResponseTemplate::GatheringStatus,
            ConversationState::LocationUpdate => ResponseTemplate::LocationUpdate,
            ConversationState::EtaConfirmation => ResponseTemplate::EtaConfirmation,
            ConversationState::IssueResolution => ResponseTemplate::GatheringInfo,
            ConversationState::EmergencyProtocol => ResponseTemplate::EmergencyProtocol,
            ConversationState::Closing => ResponseTemplate::Closing,
            ConversationState::Escalation => ResponseTemplate::Escalation,
        }
    }

    pub fn render(&self, template: ResponseTemplate, context: &ConversationContext) -> TurnDecision {
        let emergency_type = if template == ResponseTemplate::EmergencyProtocol {
            Some(context.emergency_type.unwrap_or(EmergencyType::General))
        } else {
            None
        };

        TurnDecision {
            message: template.render(context),
            state: context.state,
            template,
            follow_up_questions: template
                .follow_up_questions()
                .iter()
                .map(|q| q.to_string())
                .collect(),
            priority: template.priority(),
            emergency_type,
        }
    }

    pub fn respond(
        &self,
        context: &ConversationContext,
        outcome: TransitionOutcome,
        scenario: &Scenario,
    ) -> TurnDecision {
        self.render(self.select(context, outcome, scenario), context)
    }
}
