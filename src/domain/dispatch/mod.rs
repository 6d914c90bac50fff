//! Dispatch check-in conversation engine.
//!
//! One turn flows straight through:
//! `DispatchEngine` -> `SpeechClassifier` -> `transition::apply` ->
//! `ResponseGenerator` -> `TurnDecision`.
//!
//! Nothing here performs I/O. Callers load and store `ConversationContext`
//! themselves and must serialize turns per call.

mod classifier;
mod context;
mod cooperation;
mod engine;
mod errors;
mod events;
mod outcome;
mod patterns;
mod response;
mod scenario;
mod state;
pub mod transition;

pub use classifier::{normalize, Classification, EmergencyType, PatternClassifier, SpeechClassifier};
pub use context::{ConversationContext, DriverStatus, InformationGathered};
pub use cooperation::CooperationLevel;
pub use engine::DispatchEngine;
pub use errors::EngineError;
pub use events::{CallEvent, CallEventKind};
pub use outcome::{CallOutcome, Disposition};
pub use patterns::PatternLibrary;
pub use response::{Priority, ResponseGenerator, ResponseTemplate, TurnDecision};
pub use scenario::Scenario;
pub use state::ConversationState;
pub use transition::{TransitionOutcome, MAX_RETRIES, MAX_UNCLEAR_RESPONSES};
