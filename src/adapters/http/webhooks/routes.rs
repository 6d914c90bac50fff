//! HTTP routes for inbound webhooks.

use axum::{routing::post, Router};

use super::handlers::{receive_retell_webhook, WebhookHandlers};

/// Creates the webhook router.
pub fn webhook_routes(handlers: WebhookHandlers) -> Router {
    Router::new()
        .route("/retell", post(receive_retell_webhook))
        .with_state(handlers)
}
