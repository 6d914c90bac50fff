//! TriggerCallHandler - Places an outbound check-in call.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::dispatch::Scenario;
use crate::domain::foundation::ValidationError;
use crate::ports::{CallControl, CallRecord, PhoneCallRequest, WebCallRequest};

use super::errors::CallError;

/// Command to start a check-in call with a driver.
#[derive(Debug, Clone)]
pub struct TriggerCallCommand {
    pub driver_name: String,
    pub load_number: String,
    /// Dial this number; `None` opens a web call instead.
    pub phone_number: Option<String>,
    /// Caller id for phone calls. Falls back to the provider's configured number.
    pub from_number: Option<String>,
    pub scenario: Scenario,
    /// Overrides the configured default agent.
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Phone,
    Web,
}

#[derive(Debug, Clone)]
pub struct TriggerCallResult {
    pub call: CallRecord,
    pub kind: CallKind,
}

/// Handler for outbound calls.
pub struct TriggerCallHandler {
    call_control: Arc<dyn CallControl>,
    default_agent_id: Option<String>,
}

impl TriggerCallHandler {
    pub fn new(call_control: Arc<dyn CallControl>, default_agent_id: Option<String>) -> Self {
        Self {
            call_control,
            default_agent_id,
        }
    }

    pub async fn handle(&self, cmd: TriggerCallCommand) -> Result<TriggerCallResult, CallError> {
        let driver_name = required("driver_name", &cmd.driver_name)?;
        let load_number = required("load_number", &cmd.load_number)?;

        let agent_id = cmd
            .agent_id
            .as_deref()
            .or(self.default_agent_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CallError::not_configured("no agent id configured"))?
            .to_string();

        let metadata = HashMap::from([
            ("driver_name".to_string(), driver_name.to_string()),
            ("load_number".to_string(), load_number.to_string()),
            ("scenario".to_string(), cmd.scenario.to_string()),
        ]);

        let phone_number = cmd
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let (call, kind) = match phone_number {
            Some(to_number) => {
                let call = self
                    .call_control
                    .create_phone_call(PhoneCallRequest {
                        agent_id,
                        to_number: to_number.to_string(),
                        from_number: cmd
                            .from_number
                            .as_deref()
                            .map(str::trim)
                            .filter(|n| !n.is_empty())
                            .map(str::to_string),
                        metadata,
                    })
                    .await?;
                (call, CallKind::Phone)
            }
            None => {
                let call = self
                    .call_control
                    .create_web_call(WebCallRequest { agent_id, metadata })
                    .await?;
                (call, CallKind::Web)
            }
        };

        tracing::info!(
            call_id = %call.call_id,
            kind = ?kind,
            load_number = %load_number,
            "Check-in call triggered"
        );

        Ok(TriggerCallResult { call, kind })
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed)
}
