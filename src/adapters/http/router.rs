//! Top-level API router.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value as JsonValue};

use crate::adapters::monitor::{monitor_routes, ObserverRegistry};

use super::calls::{call_routes, CallHandlers};
use super::webhooks::{webhook_routes, WebhookHandlers};

/// Mounts every endpoint:
///
/// - `POST /api/webhooks/retell`
/// - `POST /api/calls`, `GET /api/calls/:id`
/// - `GET /api/monitor/conversation` (WebSocket), `GET /api/monitor/status`
/// - `GET /health`
pub fn api_router(
    webhooks: WebhookHandlers,
    calls: CallHandlers,
    registry: Arc<ObserverRegistry>,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/webhooks", webhook_routes(webhooks))
        .nest("/api/calls", call_routes(calls))
        .nest("/api/monitor", monitor_routes(registry))
}

async fn health() -> Json<JsonValue> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
