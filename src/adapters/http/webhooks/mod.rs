//! HTTP adapter for the Retell webhook endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AckResponse, CallAnalyzedResponse, CallEndedResponse, CallStartedResponse, SpeechAnalysis,
    SpeechAnalysisResponse, TurnResponse,
};
pub use handlers::{WebhookHandlers, FALLBACK_DRIVER_NAME};
pub use routes::webhook_routes;
