//! Pattern library for driver speech.
//!
//! Raw pattern tables are plain data; `PatternLibrary::builtin()` compiles
//! them once. Emergency, cooperation and status patterns run against the
//! normalized (lowercased) utterance. Location and timing patterns are
//! case-insensitive and run against the trimmed original so the driver's
//! casing is echoed back.

use once_cell::sync::Lazy;
use regex::Regex;

use super::classifier::EmergencyType;
use super::context::DriverStatus;

/// Emergency triggers, in priority order. The first category with any
/// matching pattern wins.
pub const EMERGENCY_PATTERNS: [(EmergencyType, &[&str]); 4] = [
    (
        EmergencyType::Accident,
        &[
            r"\b(?:accident|crashed|collision|hit|rear.?end(?:ed)?|side.?swiped?)\b",
            r"\b(?:crash|wreck|smash)\b",
        ],
    ),
    (
        EmergencyType::Breakdown,
        &[
            r"\b(?:broke.?down|broken.?down|engine|tire|blowout|mechanical)\b",
            r"\b(?:won'?t.?start|overheating|smoke|leak)\b",
        ],
    ),
    (
        EmergencyType::Medical,
        &[
            r"\b(?:medical|emergency|hurt|injured|pain|sick|hospital|911|ambulance)\b",
            r"\b(?:chest.?pain|difficulty.?breathing|unconscious)\b",
        ],
    ),
    (
        EmergencyType::General,
        &[r"\b(?:emergency|help|urgent|serious.?problem|big.?problem|trouble)\b"],
    ),
];

/// Any match marks the turn uncooperative. Checked before the positive set.
pub const NEGATIVE_COOPERATION_PATTERNS: &[&str] = &[
    r"\b(?:busy|can'?t.?talk|not.?now|whatever|don'?t.?know)\b",
    r"\b(?:leave.?me.?alone|stop.?calling|annoying)\b",
];

pub const POSITIVE_COOPERATION_PATTERNS: &[&str] = &[
    r"\b(?:sure|absolutely|of.?course|definitely|let.?me|i'?m.?at|currently)\b",
    r"\b(?:everything.?is|going.?well|no.?problem|all.?good)\b",
];

/// Transcriber markers for speech it could not resolve.
pub const UNCLEAR_MARKERS: &[&str] = &["[inaudible]", "[unclear]"];

const STATE_CODES: &str = "al|ak|az|ar|ca|co|ct|de|dc|fl|ga|hi|id|il|in|ia|ks|ky|la|me|md|ma|mi|mn|ms|mo|mt|ne|nv|nh|nj|nm|ny|nc|nd|oh|ok|or|pa|ri|sc|sd|tn|tx|ut|vt|va|wa|wv|wi|wy";

/// Location patterns, in priority order: highways, mile markers,
/// "City, ST", then dock/door/bay numbers.
pub static LOCATION_PATTERNS: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        r"(?i)\b(?:i-\d+|us-\d+|interstate\s+\d+|highway\s+\d+|route\s+\d+)\b".to_string(),
        r"(?i)\bmile\s+marker\s+\d+\b".to_string(),
        format!(r"(?i)\b[a-z]+(?:\s+[a-z]+)?,\s+(?:{})\b", STATE_CODES),
        r"(?i)\b(?:dock|door|bay)\s+\d+\b".to_string(),
    ]
});

/// Status trigger phrases, in priority order.
pub const STATUS_PATTERNS: [(DriverStatus, &str); 4] = [
    (DriverStatus::Arrived, r"\b(?:arrived|here|at the|made it)\b"),
    (
        DriverStatus::Driving,
        r"\b(?:driving|on the road|en route|heading|on my way)\b",
    ),
    (
        DriverStatus::Delayed,
        r"\b(?:delayed|running late|behind|stuck|traffic)\b",
    ),
    (
        DriverStatus::Unloading,
        r"\b(?:unloading|unload|dock|backing up|delivery)\b",
    ),
];

/// Timing patterns, in priority order: clock time, duration, day part.
pub const TIMING_PATTERNS: &[&str] = &[
    r"(?i)\b\d{1,2}:\d{2}(?:\s?[ap]m\b)?",
    r"(?i)\b\d+\s+(?:minutes?|mins?|hours?|hrs?)\b",
    r"(?i)\b(?:tomorrow|today|tonight|morning|afternoon|evening)\b",
];

/// Compiled form of the pattern tables.
#[derive(Debug)]
pub struct PatternLibrary {
    pub emergency: Vec<(EmergencyType, Vec<Regex>)>,
    pub negative_cooperation: Vec<Regex>,
    pub positive_cooperation: Vec<Regex>,
    pub location: Vec<Regex>,
    pub status: Vec<(DriverStatus, Regex)>,
    pub timing: Vec<Regex>,
}

static BUILTIN: Lazy<PatternLibrary> = Lazy::new(PatternLibrary::compile);

impl PatternLibrary {
    /// The shared, compiled built-in library.
    pub fn builtin() -> &'static PatternLibrary {
        &BUILTIN
    }

    fn compile() -> Self {
        Self {
            emergency: EMERGENCY_PATTERNS
                .iter()
                .map(|(kind, patterns)| (*kind, compile_all(patterns.iter().copied())))
                .collect(),
            negative_cooperation: compile_all(NEGATIVE_COOPERATION_PATTERNS.iter().copied()),
            positive_cooperation: compile_all(POSITIVE_COOPERATION_PATTERNS.iter().copied()),
            location: compile_all(LOCATION_PATTERNS.iter().map(String::as_str)),
            status: STATUS_PATTERNS
                .iter()
                .map(|(status, pattern)| (*status, compile(pattern)))
                .collect(),
            timing: compile_all(TIMING_PATTERNS.iter().copied()),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("built-in pattern {pattern:?} is invalid: {e}"))
}

fn compile_all<'a>(patterns: impl Iterator<Item = &'a str>) -> Vec<Regex> {
    patterns.map(compile).collect()
}

/// Returns the first match of the first pattern that matches.
pub(crate) fn first_match<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| m.as_str())
}
