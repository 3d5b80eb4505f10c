//! Agent port
//!
//! The uniform capability every deliberating agent exposes, whether it runs
//! in-process, behind a synchronous HTTP endpoint or behind a webhook.
//! Results are raw payloads; the engine validates them.

use async_trait::async_trait;
use roundtable_domain::{
    AgentAnalysis, AnalysisPayload, ChallengePayload, FailureKind, Synthesis, TaskInput,
    VotePayload,
};
use std::time::Duration;
use thiserror::Error;

/// Errors an agent call can end with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Agent unavailable: {0}")]
    Unavailable(String),

    #[error("Call cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }

    /// A malformed answer is a validation failure and may be retried once;
    /// timeouts and transport failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Malformed(_))
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AgentError::Timeout(_) => FailureKind::AgentTimeout,
            AgentError::Malformed(_) => FailureKind::Validation,
            AgentError::Transport(_) | AgentError::Unavailable(_) => FailureKind::AgentUnavailable,
            AgentError::Cancelled => FailureKind::Cancelled,
        }
    }
}

/// A deliberating agent
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn domain(&self) -> &str;

    /// Independent analysis of the task input.
    async fn analyze(&self, task: &TaskInput) -> Result<AnalysisPayload, AgentError>;

    /// Objections and concessions against the other agents' accepted findings.
    async fn challenge(
        &self,
        task: &TaskInput,
        analyses: &[AgentAnalysis],
    ) -> Result<ChallengePayload, AgentError>;

    /// Approve or dissent on the synthesis.
    async fn vote(&self, task: &TaskInput, synthesis: &Synthesis) -> Result<VotePayload, AgentError>;

    /// Liveness probe. In-process agents are always healthy.
    async fn health(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_malformed_is_retryable() {
        assert!(AgentError::Malformed("bad json".into()).is_retryable());
        assert!(!AgentError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!AgentError::Transport("reset".into()).is_retryable());
        assert!(!AgentError::Cancelled.is_retryable());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            AgentError::Timeout(Duration::from_secs(1)).kind(),
            FailureKind::AgentTimeout
        );
        assert_eq!(
            AgentError::Unavailable("down".into()).kind(),
            FailureKind::AgentUnavailable
        );
    }
}
