//! HTTP handler for Retell webhooks.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value as JsonValue;

use crate::adapters::retell::{RetellWebhook, RetellWebhookVerifier, SIGNATURE_HEADER};
use crate::application::{
    AnalyzeSpeechCommand, AnalyzeSpeechHandler, CallError, EndCallCommand, EndCallHandler,
    ProcessTurnCommand, ProcessTurnHandler, StartCallCommand, StartCallHandler,
};
use crate::domain::dispatch::{CallEvent, Scenario};
use crate::domain::foundation::CallId;
use crate::ports::CallObserver;

use super::super::error::{handle_call_error, ErrorResponse};
use super::dto::{
    AckResponse, CallAnalyzedResponse, CallEndedResponse, CallStartedResponse,
    SpeechAnalysisResponse, TurnResponse,
};

/// Driver name used when a call carries none (browser test calls).
pub const FALLBACK_DRIVER_NAME: &str = "Web Test Driver";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookHandlers {
    start_handler: Arc<StartCallHandler>,
    turn_handler: Arc<ProcessTurnHandler>,
    speech_handler: Arc<AnalyzeSpeechHandler>,
    end_handler: Arc<EndCallHandler>,
    observer: Arc<dyn CallObserver>,
    verifier: Option<Arc<RetellWebhookVerifier>>,
    default_scenario: Scenario,
}

impl WebhookHandlers {
    pub fn new(
        start_handler: Arc<StartCallHandler>,
        turn_handler: Arc<ProcessTurnHandler>,
        speech_handler: Arc<AnalyzeSpeechHandler>,
        end_handler: Arc<EndCallHandler>,
        observer: Arc<dyn CallObserver>,
    ) -> Self {
        Self {
            start_handler,
            turn_handler,
            speech_handler,
            end_handler,
            observer,
            verifier: None,
            default_scenario: Scenario::default(),
        }
    }

    /// Require a valid `x-retell-signature` on every request.
    pub fn with_verifier(mut self, verifier: RetellWebhookVerifier) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Scenario for calls whose metadata names none.
    pub fn with_default_scenario(mut self, scenario: Scenario) -> Self {
        self.default_scenario = scenario;
        self
    }

    fn scenario_for(&self, webhook: &RetellWebhook) -> Scenario {
        webhook
            .scenario()
            .map(Scenario::parse)
            .unwrap_or_else(|| self.default_scenario.clone())
    }
}

/// Driver and load for a call, with the browser-test fallbacks.
fn call_identity(webhook: &RetellWebhook, call_id: &CallId) -> (String, String) {
    let driver_name = webhook
        .driver_name()
        .unwrap_or(FALLBACK_DRIVER_NAME)
        .to_string();
    let load_number = webhook.load_number().map(str::to_string).unwrap_or_else(|| {
        let prefix: String = call_id.as_str().chars().take(8).collect();
        format!("WEB-{}", prefix)
    });
    (driver_name, load_number)
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/retell - Receive a Retell call event
pub async fn receive_retell_webhook(
    State(handlers): State<WebhookHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &handlers.verifier {
        let signature = match headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
            Some(signature) => signature,
            None => {
                tracing::warn!("Retell webhook without signature");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::unauthorized("Missing webhook signature")),
                )
                    .into_response();
            }
        };
        if let Err(e) = verifier.verify(&body, signature) {
            tracing::warn!(error = %e, "Retell webhook signature rejected");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized(e.to_string())),
            )
                .into_response();
        }
    }

    let payload: JsonValue = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!("Invalid JSON: {}", e))),
            )
                .into_response()
        }
    };
    let webhook: RetellWebhook = match serde_json::from_value(payload.clone()) {
        Ok(webhook) => webhook,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!("Invalid webhook: {}", e))),
            )
                .into_response()
        }
    };

    let call_id = webhook
        .resolved_call_id()
        .and_then(|id| CallId::new(id).ok());

    tracing::debug!(
        event = %webhook.event,
        call_id = call_id.as_ref().map(CallId::as_str).unwrap_or("unknown"),
        "Retell webhook received"
    );

    handlers.observer.publish(CallEvent::webhook_received(
        call_id.clone().unwrap_or_else(CallId::unknown),
        webhook.event.clone(),
        payload,
    ));

    match webhook.event.as_str() {
        "call_started" => match call_id {
            Some(call_id) => call_started(&handlers, &webhook, call_id).await,
            None => missing_call_id(),
        },
        "agent_response_required" => match call_id {
            Some(call_id) => agent_response_required(&handlers, &webhook, call_id).await,
            None => missing_call_id(),
        },
        "user_speech" => {
            let result = handlers.speech_handler.handle(AnalyzeSpeechCommand {
                utterance: webhook.speech().to_string(),
            });
            Json(SpeechAnalysisResponse::from(result)).into_response()
        }
        "call_ended" => match call_id {
            Some(call_id) => call_ended(&handlers, &webhook, call_id).await,
            None => missing_call_id(),
        },
        "call_analyzed" => Json(CallAnalyzedResponse {
            call_id: call_id.map(|id| id.to_string()),
            analysis: webhook.analysis(),
            status: "analysis_received",
        })
        .into_response(),
        _ => Json(AckResponse::success()).into_response(),
    }
}

async fn call_started(handlers: &WebhookHandlers, webhook: &RetellWebhook, call_id: CallId) -> Response {
    let (driver_name, load_number) = call_identity(webhook, &call_id);
    let cmd = StartCallCommand {
        call_id,
        driver_name,
        load_number,
        scenario: handlers.scenario_for(webhook),
    };

    match handlers.start_handler.handle(cmd).await {
        Ok(result) => Json(CallStartedResponse::from(result)).into_response(),
        Err(e) => handle_call_error(e),
    }
}

async fn agent_response_required(
    handlers: &WebhookHandlers,
    webhook: &RetellWebhook,
    call_id: CallId,
) -> Response {
    let (driver_name, load_number) = call_identity(webhook, &call_id);
    let cmd = ProcessTurnCommand {
        call_id,
        utterance: webhook.last_user_input.clone().unwrap_or_default(),
        driver_name,
        load_number,
        scenario: handlers.scenario_for(webhook),
    };

    match handlers.turn_handler.handle(cmd).await {
        Ok(result) => Json(TurnResponse::from(result)).into_response(),
        Err(e) => handle_call_error(e),
    }
}

async fn call_ended(handlers: &WebhookHandlers, webhook: &RetellWebhook, call_id: CallId) -> Response {
    let call = webhook.call.clone().unwrap_or_default();
    let (driver_name, load_number) = call_identity(webhook, &call_id);

    let outcome = match handlers
        .end_handler
        .handle(EndCallCommand {
            call_id: call_id.clone(),
        })
        .await
    {
        Ok(result) => Some(result.outcome),
        Err(CallError::NotFound(_)) => {
            tracing::info!(call_id = %call_id, "Call ended without a stored conversation");
            None
        }
        Err(e) => return handle_call_error(e),
    };

    let (driver_name, load_number) = match &outcome {
        Some(outcome) => (outcome.driver_name.clone(), outcome.load_number.clone()),
        None => (driver_name, load_number),
    };

    Json(CallEndedResponse {
        call_id: call_id.to_string(),
        status: "completed",
        driver_name,
        load_number,
        transcript: call
            .transcript
            .clone()
            .or_else(|| webhook.transcript.clone())
            .unwrap_or_default(),
        duration: call.duration_secs().unwrap_or(0),
        outcome,
    })
    .into_response()
}

fn missing_call_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request("Webhook has no call_id")),
    )
        .into_response()
}
