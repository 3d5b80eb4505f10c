//! Human feedback signals

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feedback a human gives on an agent's contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSignal {
    /// The contribution was used as-is
    Accept,
    /// The contribution was wrong
    Reject,
    /// The contribution was used after edits
    Modify,
    /// The contribution was ignored; carries no information
    Dismiss,
}

impl FeedbackSignal {
    pub fn as_str(&self) -> &str {
        match self {
            FeedbackSignal::Accept => "accept",
            FeedbackSignal::Reject => "reject",
            FeedbackSignal::Modify => "modify",
            FeedbackSignal::Dismiss => "dismiss",
        }
    }
}

impl fmt::Display for FeedbackSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept" | "accepted" => Ok(FeedbackSignal::Accept),
            "reject" | "rejected" => Ok(FeedbackSignal::Reject),
            "modify" | "modified" => Ok(FeedbackSignal::Modify),
            "dismiss" | "dismissed" => Ok(FeedbackSignal::Dismiss),
            other => Err(format!("unknown feedback signal '{}'", other)),
        }
    }
}
