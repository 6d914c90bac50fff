//! AnalyzeSpeechHandler - Classifies a single utterance.
//!
//! Read-only: no context is loaded or saved.

use std::sync::Arc;

use crate::domain::dispatch::{Classification, PatternClassifier, SpeechClassifier};

#[derive(Debug, Clone)]
pub struct AnalyzeSpeechCommand {
    pub utterance: String,
}

#[derive(Debug, Clone)]
pub struct AnalyzeSpeechResult {
    pub classification: Classification,
}

impl AnalyzeSpeechResult {
    pub fn emergency_detected(&self) -> bool {
        self.classification.emergency.is_some()
    }
}

/// Handler for standalone speech analysis.
pub struct AnalyzeSpeechHandler {
    classifier: Arc<dyn SpeechClassifier>,
}

impl AnalyzeSpeechHandler {
    pub fn new(classifier: Arc<dyn SpeechClassifier>) -> Self {
        Self { classifier }
    }

    pub fn handle(&self, cmd: AnalyzeSpeechCommand) -> AnalyzeSpeechResult {
        let classification = self.classifier.classify(&cmd.utterance);
        if let Some(emergency_type) = classification.emergency {
            tracing::warn!(emergency_type = %emergency_type, "Emergency heard in user speech");
        }
        AnalyzeSpeechResult { classification }
    }
}

impl Default for AnalyzeSpeechHandler {
    fn default() -> Self {
        Self::new(Arc::new(PatternClassifier::new()))
    }
}
