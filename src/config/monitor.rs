//! Live monitor and engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::monitor::DEFAULT_CHANNEL_CAPACITY;
use crate::domain::dispatch::Scenario;

/// Monitor fan-out configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Events buffered per observer before the oldest are dropped
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channel_capacity == 0 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

/// Conversation engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Scenario for calls whose metadata names none
    #[serde(default = "default_scenario")]
    pub default_scenario: String,
}

impl EngineConfig {
    pub fn scenario(&self) -> Scenario {
        Scenario::parse(&self.default_scenario)
    }

    /// The default must be a scenario the engine drives; per-call
    /// overrides may still name unknown ones.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.scenario().is_recognized() {
            return Err(ValidationError::UnknownScenario(self.default_scenario.clone()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_scenario: default_scenario(),
        }
    }
}

fn default_scenario() -> String {
    Scenario::DriverCheckin.to_string()
}
