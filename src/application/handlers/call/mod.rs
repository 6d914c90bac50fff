//! Call lifecycle handlers.
//!
//! One handler per inbound webhook event, plus outbound call triggering.
//! Handlers that touch a call's context share a `CallLocks` so turns for
//! one call never interleave.

mod analyze_speech;
mod call_locks;
mod end_call;
mod errors;
mod get_call;
mod process_turn;
mod start_call;
mod trigger_call;

pub use analyze_speech::{AnalyzeSpeechCommand, AnalyzeSpeechHandler, AnalyzeSpeechResult};
pub use call_locks::{CallLocks, CallTurn};
pub use end_call::{EndCallCommand, EndCallHandler, EndCallResult};
pub use errors::CallError;
pub use get_call::{GetCallHandler, GetCallQuery};
pub use process_turn::{ProcessTurnCommand, ProcessTurnHandler, ProcessTurnResult};
pub use start_call::{StartCallCommand, StartCallHandler, StartCallResult};
pub use trigger_call::{CallKind, TriggerCallCommand, TriggerCallHandler, TriggerCallResult};
