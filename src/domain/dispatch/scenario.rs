//! Conversation scenarios.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Which transition table drives the call.
///
/// Parsing never fails: unknown names are kept so they can be logged and
/// the call continues as a pass-through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scenario {
    #[default]
    DriverCheckin,
    Unrecognized(String),
}

impl Scenario {
    pub const DRIVER_CHECKIN: &'static str = "driver_checkin";

    pub fn parse(name: &str) -> Self {
        match name.trim() {
            Self::DRIVER_CHECKIN => Self::DriverCheckin,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DriverCheckin => Self::DRIVER_CHECKIN,
            Self::Unrecognized(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl FromStr for Scenario {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Scenario {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for Scenario {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<Scenario> for String {
    fn from(scenario: Scenario) -> Self {
        scenario.as_str().to_string()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
