//! HTTP handlers for call endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{GetCallHandler, GetCallQuery, TriggerCallCommand, TriggerCallHandler};
use crate::domain::dispatch::Scenario;

use super::super::error::handle_call_error;
use super::dto::{CallResponse, TriggerCallRequest};

#[derive(Clone)]
pub struct CallHandlers {
    trigger_handler: Arc<TriggerCallHandler>,
    get_handler: Arc<GetCallHandler>,
    default_scenario: Scenario,
}

impl CallHandlers {
    pub fn new(
        trigger_handler: Arc<TriggerCallHandler>,
        get_handler: Arc<GetCallHandler>,
        default_scenario: Scenario,
    ) -> Self {
        Self {
            trigger_handler,
            get_handler,
            default_scenario,
        }
    }
}

/// POST /api/calls - Place a check-in call
pub async fn trigger_call(
    State(handlers): State<CallHandlers>,
    Json(req): Json<TriggerCallRequest>,
) -> Response {
    let cmd = TriggerCallCommand {
        driver_name: req.driver_name,
        load_number: req.load_number,
        phone_number: req.phone_number,
        from_number: req.from_number,
        scenario: req
            .scenario
            .as_deref()
            .map(Scenario::parse)
            .unwrap_or_else(|| handlers.default_scenario.clone()),
        agent_id: req.agent_id,
    };

    match handlers.trigger_handler.handle(cmd).await {
        Ok(result) => (StatusCode::CREATED, Json(CallResponse::from(result))).into_response(),
        Err(e) => handle_call_error(e),
    }
}

/// GET /api/calls/:id - Fetch a call from the provider
pub async fn get_call(State(handlers): State<CallHandlers>, Path(call_id): Path<String>) -> Response {
    match handlers.get_handler.handle(GetCallQuery { call_id }).await {
        Ok(record) => (StatusCode::OK, Json(CallResponse::from(record))).into_response(),
        Err(e) => handle_call_error(e),
    }
}
