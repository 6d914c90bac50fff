//! Per-call conversation context.
//!
//! The context is the only state carried between turns. The engine takes it
//! by value and hands back a new one; the caller persists it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::classifier::EmergencyType;
use super::cooperation::CooperationLevel;
use super::errors::EngineError;
use super::state::ConversationState;
use crate::domain::foundation::ValidationError;

/// What the driver said they are doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Arrived,
    Driving,
    Delayed,
    Unloading,
}

impl DriverStatus {
    /// Returns true when the check-in needs nothing more from the driver.
    pub fn completes_checkin(&self) -> bool {
        matches!(self, Self::Arrived | Self::Unloading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arrived => "arrived",
            Self::Driving => "driving",
            Self::Delayed => "delayed",
            Self::Unloading => "unloading",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields pulled out of the driver's speech.
///
/// Serializes as a `field name -> value` map with absent fields omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationGathered {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_status: Option<DriverStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_info: Option<String>,
}

impl InformationGathered {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.driver_status.is_none() && self.timing_info.is_none()
    }

    /// Overwrites the fields present in `newer`; fields it lacks are kept.
    pub fn merge(&mut self, newer: &InformationGathered) {
        if let Some(location) = &newer.location {
            self.location = Some(location.clone());
        }
        if let Some(status) = newer.driver_status {
            self.driver_status = Some(status);
        }
        if let Some(timing) = &newer.timing_info {
            self.timing_info = Some(timing.clone());
        }
    }
}

/// State carried across the turns of one call.
///
/// Counters only ever increase, and `emergency_detected` never resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub state: ConversationState,
    pub driver_name: String,
    pub load_number: String,
    pub cooperation_level: CooperationLevel,
    #[serde(default)]
    pub information_gathered: InformationGathered,
    pub emergency_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<EmergencyType>,
    pub retry_count: u32,
    pub unclear_responses: u32,
}

impl ConversationContext {
    /// Creates the context for a new call: `Opening`, neutral, counters at zero.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidContext` if the driver name or load
    /// number is blank.
    pub fn new(
        driver_name: impl Into<String>,
        load_number: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let context = Self {
            state: ConversationState::Opening,
            driver_name: driver_name.into(),
            load_number: load_number.into(),
            cooperation_level: CooperationLevel::Neutral,
            information_gathered: InformationGathered::default(),
            emergency_detected: false,
            emergency_type: None,
            retry_count: 0,
            unclear_responses: 0,
        };
        context.validate()?;
        Ok(context)
    }

    /// Checks the invariants a caller-supplied context must satisfy.
    ///
    /// # Errors
    ///
    /// - blank `driver_name` or `load_number`
    /// - `emergency_detected` and `state` disagree about the emergency protocol
    /// - emergency protocol without a recorded emergency type
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.driver_name.trim().is_empty() {
            return Err(ValidationError::empty_field("driver_name").into());
        }
        if self.load_number.trim().is_empty() {
            return Err(ValidationError::empty_field("load_number").into());
        }

        let in_protocol = self.state == ConversationState::EmergencyProtocol;
        if self.emergency_detected != in_protocol {
            return Err(ValidationError::invalid_format(
                "state",
                format!(
                    "emergency_detected={} is inconsistent with state {}",
                    self.emergency_detected, self.state
                ),
            )
            .into());
        }
        if in_protocol && self.emergency_type.is_none() {
            return Err(ValidationError::invalid_format(
                "emergency_type",
                "emergency protocol requires a recorded emergency type",
            )
            .into());
        }

        Ok(())
    }
}
