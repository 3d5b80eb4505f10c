//! Reasons the evidence enforcer refuses agent output

use crate::core::error::FailureKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectionReason {
    #[error("Payload is {bytes} bytes, limit is {max}")]
    PayloadTooLarge { bytes: usize, max: usize },

    #[error("Payload names agent '{reported}' but was returned by '{expected}'")]
    AgentMismatch { expected: String, reported: String },

    #[error("Analysis contains no findings")]
    NoFindings,

    #[error("Analysis contains {count} findings, limit is {max}")]
    TooManyFindings { count: usize, max: usize },

    #[error("Finding {index} has no claim")]
    EmptyClaim { index: usize },

    #[error("Finding {index} claim is {len} characters, limit is {max}")]
    ClaimTooLong { index: usize, len: usize, max: usize },

    #[error("Finding {index} has no evidence")]
    MissingEvidence { index: usize },

    #[error("Finding {index} evidence is shorter than {min} characters")]
    EvidenceTooShort { index: usize, min: usize },

    #[error("Finding {index} evidence does not appear in the task input")]
    EvidenceNotFound { index: usize },

    #[error("Finding {index} confidence {value} is outside [0, 1]")]
    InvalidConfidence { index: usize, value: f64 },

    #[error("Challenge target '{0}' does not name an accepted finding")]
    UnknownTarget(String),

    #[error("Agent cannot challenge its own finding '{0}'")]
    SelfTarget(String),

    #[error("Payload contains {count} challenges, limit is {max}")]
    TooManyChallenges { count: usize, max: usize },

    #[error("Challenge against '{0}' has no rationale")]
    MissingRationale(String),

    #[error("Text is {len} characters, limit is {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("Vote decision '{0}' is not approve or dissent")]
    InvalidDecision(String),

    #[error("Vote has no reason")]
    MissingReason,
}

impl RejectionReason {
    pub fn kind(&self) -> FailureKind {
        match self {
            RejectionReason::MissingEvidence { .. }
            | RejectionReason::EvidenceTooShort { .. }
            | RejectionReason::EvidenceNotFound { .. } => FailureKind::EvidenceMissing,
            _ => FailureKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_kinds() {
        assert_eq!(
            RejectionReason::EvidenceNotFound { index: 0 }.kind(),
            FailureKind::EvidenceMissing
        );
        assert_eq!(
            RejectionReason::MissingEvidence { index: 1 }.kind(),
            FailureKind::EvidenceMissing
        );
        assert_eq!(RejectionReason::NoFindings.kind(), FailureKind::Validation);
        assert_eq!(
            RejectionReason::InvalidDecision("maybe".into()).kind(),
            FailureKind::Validation
        );
    }
}
