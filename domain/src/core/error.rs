//! Domain error types
//!
//! [`FailureKind`] is the stable taxonomy shown to callers. Internal errors
//! carry detail for logs and convert into a [`UserFacingError`] whose message
//! is safe to display.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Agent output had the wrong shape or violated a bound
    Validation,
    /// A finding cited evidence that is absent from the task input
    EvidenceMissing,
    /// An agent did not answer within its deadline
    AgentTimeout,
    /// An agent could not be reached or failed while answering
    AgentUnavailable,
    /// Too few agents survived a phase
    QuorumNotMet,
    /// A remote endpoint resolved to a forbidden address
    SsrfRejected,
    /// Registry or artifact storage could not serve the request
    RegistryOrStorageFailure,
    /// The caller's request was unusable
    InvalidRequest,
    /// The task was cancelled
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::EvidenceMissing => "evidence_missing",
            FailureKind::AgentTimeout => "agent_timeout",
            FailureKind::AgentUnavailable => "agent_unavailable",
            FailureKind::QuorumNotMet => "quorum_not_met",
            FailureKind::SsrfRejected => "ssrf_rejected",
            FailureKind::RegistryOrStorageFailure => "registry_or_storage_failure",
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Cancelled => "cancelled",
        }
    }

    /// Per-agent failures degrade the agent; the others end the task.
    pub fn is_per_agent(&self) -> bool {
        matches!(
            self,
            FailureKind::Validation
                | FailureKind::EvidenceMissing
                | FailureKind::AgentTimeout
                | FailureKind::AgentUnavailable
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error as shown to a caller: a kind plus a sanitized message
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct UserFacingError {
    pub kind: FailureKind,
    pub message: String,
}

impl UserFacingError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Task already reached terminal state {0}")]
    AlreadyTerminal(String),
}

impl DomainError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DomainError::InvalidRequest(_) => FailureKind::InvalidRequest,
            DomainError::InvalidTransition { .. } | DomainError::AlreadyTerminal(_) => {
                FailureKind::RegistryOrStorageFailure
            }
        }
    }
}
