//! Driver cooperation assessment.

use serde::{Deserialize, Serialize};

/// How willing the driver sounds on the latest turn.
///
/// Reassessed every turn; it can move in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CooperationLevel {
    Cooperative,
    #[default]
    Neutral,
    Uncooperative,
    Hostile,
}

impl CooperationLevel {
    /// Returns true when the turn should count against the retry budget.
    pub fn is_resistant(&self) -> bool {
        matches!(self, Self::Uncooperative | Self::Hostile)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cooperative => "cooperative",
            Self::Neutral => "neutral",
            Self::Uncooperative => "uncooperative",
            Self::Hostile => "hostile",
        }
    }
}
