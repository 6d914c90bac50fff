//! Structured end-of-call result.

use serde::{Deserialize, Serialize};

use super::classifier::EmergencyType;
use super::context::{ConversationContext, InformationGathered};
use super::cooperation::CooperationLevel;
use super::state::ConversationState;
use crate::domain::foundation::CallId;

/// How the call ended, from dispatch's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Check-in finished normally.
    Completed,
    /// Handed to a human dispatcher.
    Escalated,
    /// Driver reported an emergency.
    Emergency,
    /// Call ended before reaching a terminal state.
    Incomplete,
}

impl Disposition {
    pub fn for_state(state: ConversationState) -> Self {
        match state {
            ConversationState::Closing => Self::Completed,
            ConversationState::Escalation => Self::Escalated,
            ConversationState::EmergencyProtocol => Self::Emergency,
            _ => Self::Incomplete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub call_id: CallId,
    pub driver_name: String,
    pub load_number: String,
    pub final_state: ConversationState,
    pub disposition: Disposition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<EmergencyType>,
    pub information_gathered: InformationGathered,
    pub cooperation_level: CooperationLevel,
    pub retry_count: u32,
    pub unclear_responses: u32,
}

impl CallOutcome {
    pub fn from_context(call_id: CallId, context: &ConversationContext) -> Self {
        Self {
            call_id,
            driver_name: context.driver_name.clone(),
            load_number: context.load_number.clone(),
            final_state: context.state,
            disposition: Disposition::for_state(context.state),
            emergency_type: context.emergency_type,
            information_gathered: context.information_gathered.clone(),
            cooperation_level: context.cooperation_level,
            retry_count: context.retry_count,
            unclear_responses: context.unclear_responses,
        }
    }

    pub fn needs_follow_up(&self) -> bool {
        self.disposition != Disposition::Completed
    }
}
