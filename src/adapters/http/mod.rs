//! HTTP adapters - REST API implementations.
//!
//! Webhooks from the voice provider and outbound call triggering. The
//! live monitor WebSocket lives in `adapters::monitor`.

pub mod calls;
pub mod error;
mod router;
pub mod webhooks;

pub use calls::{call_routes, CallHandlers};
pub use error::{handle_call_error, ErrorResponse};
pub use router::api_router;
pub use webhooks::{webhook_routes, WebhookHandlers};
