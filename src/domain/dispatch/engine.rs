//! Turn orchestrator.
//!
//! `DispatchEngine` is the public entry point for one conversation turn:
//! classify, transition, respond. It holds configuration only; the caller
//! owns and persists the context between turns.

use tracing::{debug, info, warn};

use super::classifier::{Classification, PatternClassifier, SpeechClassifier};
use super::context::ConversationContext;
use super::errors::EngineError;
use super::response::{ResponseGenerator, ResponseTemplate, TurnDecision};
use super::scenario::Scenario;
use super::transition::{self, TransitionOutcome};

/// Decides what the voice agent says next.
///
/// Deterministic: the same context and utterance always produce the same
/// result. Safe to share across tasks.
#[derive(Debug, Clone)]
pub struct DispatchEngine<C: SpeechClassifier = PatternClassifier> {
    scenario: Scenario,
    classifier: C,
    responses: ResponseGenerator,
}

impl DispatchEngine<PatternClassifier> {
    /// Creates an engine using the built-in pattern classifier.
    pub fn new(scenario: Scenario) -> Self {
        Self::with_classifier(scenario, PatternClassifier::new())
    }
}

impl Default for DispatchEngine<PatternClassifier> {
    fn default() -> Self {
        Self::new(Scenario::DriverCheckin)
    }
}

impl<C: SpeechClassifier> DispatchEngine<C> {
    pub fn with_classifier(scenario: Scenario, classifier: C) -> Self {
        if !scenario.is_recognized() {
            warn!(scenario = %scenario, "Unrecognized scenario, turns will pass through");
        }
        Self {
            scenario,
            classifier,
            responses: ResponseGenerator,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Context for a new call, in `Opening`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidContext` for a blank driver name or load number.
    pub fn initial_context(
        &self,
        driver_name: &str,
        load_number: &str,
    ) -> Result<ConversationContext, EngineError> {
        ConversationContext::new(driver_name, load_number)
    }

    /// The greeting spoken when the call connects.
    pub fn greet(&self, context: &ConversationContext) -> TurnDecision {
        self.responses.render(ResponseTemplate::Opening, context)
    }

    /// Classifies an utterance without applying it to any context.
    pub fn classify(&self, utterance: &str) -> Classification {
        self.classifier.classify(utterance)
    }

    /// Runs one turn.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidContext` if `context` fails validation.
    /// Unclear or uncooperative speech is never an error.
    pub fn decide(
        &self,
        context: ConversationContext,
        utterance: &str,
    ) -> Result<(ConversationContext, TurnDecision), EngineError> {
        context.validate()?;

        let from = context.state;
        let classification = self.classifier.classify(utterance);
        let (next, outcome) = transition::apply(context, &classification, &self.scenario)?;
        let decision = self.responses.respond(&next, outcome, &self.scenario);

        match outcome {
            TransitionOutcome::Emergency(kind) => warn!(
                from = %from,
                emergency_type = %kind,
                load_number = %next.load_number,
                "Emergency detected"
            ),
            TransitionOutcome::Escalated => info!(
                from = %from,
                retry_count = next.retry_count,
                "Retry budget exhausted, escalating"
            ),
            TransitionOutcome::NoisyEnvironment => info!(
                state = %next.state,
                unclear_responses = next.unclear_responses,
                "Noisy environment"
            ),
            _ => debug!(
                from = %from,
                state = %next.state,
                template = %decision.template,
                cooperation = next.cooperation_level.as_str(),
                "Turn decided"
            ),
        }

        Ok((next, decision))
    }
}
