//! Speech classification.
//!
//! Turns one driver utterance into the signals the transition function
//! needs: emergency type, clarity, cooperation and extracted fields.
//! `SpeechClassifier` is the seam for swapping the regex classifier for a
//! model-backed one without touching transitions or responses.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::InformationGathered;
use super::cooperation::CooperationLevel;
use super::patterns::{first_match, PatternLibrary, UNCLEAR_MARKERS};

/// Utterances shorter than this (in characters, after trimming) are unclear.
pub const MIN_CLEAR_LENGTH: usize = 3;

/// Utterances containing an ellipsis are unclear below this length.
pub const ELLIPSIS_UNCLEAR_LENGTH: usize = 10;

/// Consonant share above which an utterance is treated as noise.
pub const MAX_CONSONANT_RATIO: f64 = 0.7;

/// Replies with at most this many words and no positive cue are terse.
pub const TERSE_WORD_LIMIT: usize = 2;

/// Kind of emergency reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    Accident,
    Breakdown,
    Medical,
    General,
}

impl EmergencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accident => "accident",
            Self::Breakdown => "breakdown",
            Self::Medical => "medical",
            Self::General => "general",
        }
    }
}

impl fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the classifier learned from one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// First matching emergency category, if any.
    pub emergency: Option<EmergencyType>,
    /// Garbled or inaudible speech. Always false when an emergency matched.
    pub unclear: bool,
    pub cooperation: CooperationLevel,
    pub extracted: InformationGathered,
}

/// Classifies a single utterance. Implementations must be pure.
pub trait SpeechClassifier: Send + Sync {
    fn classify(&self, utterance: &str) -> Classification;
}

/// Lowercases and trims an utterance, folding curly apostrophes so
/// contractions like "can’t" match.
pub fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase().replace('\u{2019}', "'")
}

/// Regex-backed classifier over the built-in pattern library.
#[derive(Debug, Clone, Copy)]
pub struct PatternClassifier {
    library: &'static PatternLibrary,
}

impl PatternClassifier {
    pub fn new() -> Self {
        Self {
            library: PatternLibrary::builtin(),
        }
    }

    /// Checks emergency categories in priority order.
    pub fn detect_emergency(&self, normalized: &str) -> Option<EmergencyType> {
        self.library
            .emergency
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(normalized)))
            .map(|(kind, _)| *kind)
    }

    /// Heuristics for inaudible, truncated or noisy transcripts.
    pub fn is_unclear(&self, normalized: &str) -> bool {
        let length = normalized.chars().count();
        if length < MIN_CLEAR_LENGTH {
            return true;
        }
        if UNCLEAR_MARKERS.iter().any(|marker| normalized.contains(marker)) {
            return true;
        }
        let has_ellipsis = normalized.contains("...") || normalized.contains('\u{2026}');
        if has_ellipsis && length < ELLIPSIS_UNCLEAR_LENGTH {
            return true;
        }

        let consonants = normalized
            .chars()
            .filter(|c| c.is_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
            .count();
        consonants as f64 / length as f64 > MAX_CONSONANT_RATIO
    }

    /// Negative cues win over positive ones; terse replies count as negative.
    pub fn assess_cooperation(&self, normalized: &str) -> CooperationLevel {
        if self
            .library
            .negative_cooperation
            .iter()
            .any(|p| p.is_match(normalized))
        {
            return CooperationLevel::Uncooperative;
        }
        if self
            .library
            .positive_cooperation
            .iter()
            .any(|p| p.is_match(normalized))
        {
            return CooperationLevel::Cooperative;
        }
        if normalized.split_whitespace().count() <= TERSE_WORD_LIMIT {
            return CooperationLevel::Uncooperative;
        }
        CooperationLevel::Neutral
    }

    /// Pulls location, status and timing. Each field is independent and
    /// left unset when nothing matches.
    pub fn extract(&self, trimmed: &str, normalized: &str) -> InformationGathered {
        let location = first_match(&self.library.location, trimmed).map(str::to_string);
        let driver_status = self
            .library
            .status
            .iter()
            .find(|(_, pattern)| pattern.is_match(normalized))
            .map(|(status, _)| *status);
        let timing_info = first_match(&self.library.timing, trimmed).map(str::to_string);

        InformationGathered {
            location,
            driver_status,
            timing_info,
        }
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechClassifier for PatternClassifier {
    fn classify(&self, utterance: &str) -> Classification {
        let trimmed = utterance.trim();
        let normalized = normalize(utterance);

        let emergency = self.detect_emergency(&normalized);
        let unclear = emergency.is_none() && self.is_unclear(&normalized);

        Classification {
            emergency,
            unclear,
            cooperation: self.assess_cooperation(&normalized),
            extracted: self.extract(trimmed, &normalized),
        }
    }
}
