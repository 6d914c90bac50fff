//! Application layer - Call lifecycle handlers.
//!
//! Orchestrates the dispatch engine and the ports: each handler loads what
//! it needs, runs the domain logic, persists, then notifies observers.

pub mod handlers;

pub use handlers::call::{
    AnalyzeSpeechCommand, AnalyzeSpeechHandler, AnalyzeSpeechResult, CallError, CallKind,
    CallLocks, CallTurn, EndCallCommand, EndCallHandler, EndCallResult, GetCallHandler,
    GetCallQuery, ProcessTurnCommand, ProcessTurnHandler, ProcessTurnResult, StartCallCommand,
    StartCallHandler, StartCallResult, TriggerCallCommand, TriggerCallHandler,
    TriggerCallResult,
};
