//! Task entity and its phase state machine
//!
//! ```text
//! Created -> [Strategizing] -> Analyzing -> Challenging -> Synthesizing -> Voting -> Finalized
//!     \___________________________________________________________________________/
//!                                         -> Failed
//! ```
//!
//! Transitions only move forward. Strategizing is the only phase that may be
//! skipped. `Finalized` and `Failed` are terminal.

use crate::core::error::{DomainError, UserFacingError};
use crate::core::identity::{IdentityContext, TenantId, UserId, string_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on a query, in characters
pub const MAX_QUERY_CHARS: usize = 100_000;

string_id! {
    /// Task identifier, unique per tenant
    TaskId
}

impl TaskId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Deliberation phase in which agents are called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Strategizing,
    Analyzing,
    Challenging,
    Synthesizing,
    Voting,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Strategizing => "strategizing",
            Phase::Analyzing => "analyzing",
            Phase::Challenging => "challenging",
            Phase::Synthesizing => "synthesizing",
            Phase::Voting => "voting",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Strategizing => "Strategy",
            Phase::Analyzing => "Independent Analysis",
            Phase::Challenging => "Cross-Examination",
            Phase::Synthesizing => "Synthesis",
            Phase::Voting => "Vote",
        }
    }

    pub fn state(&self) -> TaskState {
        match self {
            Phase::Strategizing => TaskState::Strategizing,
            Phase::Analyzing => TaskState::Analyzing,
            Phase::Challenging => TaskState::Challenging,
            Phase::Synthesizing => TaskState::Synthesizing,
            Phase::Voting => TaskState::Voting,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Created,
    Strategizing,
    Analyzing,
    Challenging,
    Synthesizing,
    Voting,
    Finalized,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Created => "created",
            TaskState::Strategizing => "strategizing",
            TaskState::Analyzing => "analyzing",
            TaskState::Challenging => "challenging",
            TaskState::Synthesizing => "synthesizing",
            TaskState::Voting => "voting",
            TaskState::Finalized => "finalized",
            TaskState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Finalized | TaskState::Failed)
    }

    /// States reachable from this one, other than `Failed`.
    pub fn successors(&self) -> &'static [TaskState] {
        match self {
            TaskState::Created => &[TaskState::Strategizing, TaskState::Analyzing],
            TaskState::Strategizing => &[TaskState::Analyzing],
            TaskState::Analyzing => &[TaskState::Challenging],
            TaskState::Challenging => &[TaskState::Synthesizing],
            TaskState::Synthesizing => &[TaskState::Voting],
            TaskState::Voting => &[TaskState::Finalized],
            TaskState::Finalized | TaskState::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, next: TaskState) -> bool {
        if next == TaskState::Failed {
            return !self.is_terminal();
        }
        self.successors().contains(&next)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the caller asks the round table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub query: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Simple requests skip strategizing
    #[serde(default)]
    pub simple: bool,
}

impl TaskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn simple(mut self) -> Self {
        self.simple = true;
        self
    }
}

/// The part of a task that agents see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub task_id: TaskId,
    pub query: String,
    pub tags: Vec<String>,
}

impl TaskInput {
    pub fn new(task_id: TaskId, query: impl Into<String>) -> Self {
        Self {
            task_id,
            query: query.into(),
            tags: Vec::new(),
        }
    }
}

/// A deliberation task (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub tenant_id: TenantId,
    pub submitted_by: UserId,
    pub query: String,
    pub tags: Vec<String>,
    pub simple: bool,
    state: TaskState,
    failure: Option<UserFacingError>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task for `identity`, rejecting empty or oversized queries.
    pub fn new(identity: &IdentityContext, request: TaskRequest) -> Result<Self, DomainError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(DomainError::InvalidRequest("query must not be empty".into()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(DomainError::InvalidRequest(format!(
                "query exceeds {} characters",
                MAX_QUERY_CHARS
            )));
        }

        Ok(Self {
            id: TaskId::generate(),
            tenant_id: identity.tenant_id.clone(),
            submitted_by: identity.user_id.clone(),
            query: query.to_string(),
            tags: request.tags,
            simple: request.simple,
            state: TaskState::Created,
            failure: None,
            created_at: Utc::now(),
        })
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn failure(&self) -> Option<&UserFacingError> {
        self.failure.as_ref()
    }

    pub fn input(&self) -> TaskInput {
        TaskInput {
            task_id: self.id.clone(),
            query: self.query.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Move forward to `next`. Use [`Task::fail`] for the failure path.
    pub fn advance(&mut self, next: TaskState) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::AlreadyTerminal(self.state.to_string()));
        }
        if next == TaskState::Failed || !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Record a terminal failure. A task that is already terminal keeps its
    /// first outcome.
    pub fn fail(&mut self, error: UserFacingError) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::AlreadyTerminal(self.state.to_string()));
        }
        self.state = TaskState::Failed;
        self.failure = Some(error);
        Ok(())
    }
}

/// Point-in-time view of a running task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub tenant_id: TenantId,
    pub state: TaskState,
    /// Agents still participating
    pub active_agents: Vec<String>,
    /// Agents excluded so far
    pub degraded_agents: Vec<String>,
    pub failure: Option<UserFacingError>,
    pub updated_at: DateTime<Utc>,
}

impl TaskSnapshot {
    pub fn of(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            tenant_id: task.tenant_id.clone(),
            state: task.state,
            active_agents: Vec::new(),
            degraded_agents: Vec::new(),
            failure: task.failure.clone(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_agents(mut self, active: Vec<String>, degraded: Vec<String>) -> Self {
        self.active_agents = active;
        self.degraded_agents = degraded;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FailureKind;
    use crate::core::identity::Role;

    fn task() -> Task {
        Task::new(
            &IdentityContext::new("acme", "alice", Role::Member),
            TaskRequest::new("Is the Q3 forecast credible?"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_task_starts_created() {
        let t = task();
        assert_eq!(t.state(), TaskState::Created);
        assert_eq!(t.tenant_id.as_str(), "acme");
        assert!(t.failure().is_none());
    }

    #[test]
    fn test_empty_query_rejected() {
        let identity = IdentityContext::new("acme", "alice", Role::Member);
        let err = Task::new(&identity, TaskRequest::new("   ")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn test_full_forward_path() {
        let mut t = task();
        for next in [
            TaskState::Strategizing,
            TaskState::Analyzing,
            TaskState::Challenging,
            TaskState::Synthesizing,
            TaskState::Voting,
            TaskState::Finalized,
        ] {
            t.advance(next).unwrap();
        }
        assert_eq!(t.state(), TaskState::Finalized);
    }

    #[test]
    fn test_strategizing_may_be_skipped() {
        let mut t = task();
        assert!(t.advance(TaskState::Analyzing).is_ok());
    }

    #[test]
    fn test_other_phases_cannot_be_skipped() {
        let mut t = task();
        t.advance(TaskState::Analyzing).unwrap();
        assert!(t.advance(TaskState::Voting).is_err());
        assert_eq!(t.state(), TaskState::Analyzing);
    }

    #[test]
    fn test_no_backward_transition() {
        let mut t = task();
        t.advance(TaskState::Analyzing).unwrap();
        t.advance(TaskState::Challenging).unwrap();
        assert!(t.advance(TaskState::Analyzing).is_err());
    }

    #[test]
    fn test_fail_is_terminal() {
        let mut t = task();
        t.advance(TaskState::Analyzing).unwrap();
        t.fail(UserFacingError::new(FailureKind::QuorumNotMet, "too few agents"))
            .unwrap();
        assert_eq!(t.state(), TaskState::Failed);
        assert!(t.advance(TaskState::Challenging).is_err());
        assert!(
            t.fail(UserFacingError::new(FailureKind::Cancelled, "late"))
                .is_err()
        );
        assert_eq!(t.failure().unwrap().kind, FailureKind::QuorumNotMet);
    }

    #[test]
    fn test_advance_to_failed_is_rejected() {
        let mut t = task();
        assert!(t.advance(TaskState::Failed).is_err());
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Analyzing < Phase::Challenging);
        assert!(Phase::Synthesizing < Phase::Voting);
        assert_eq!(Phase::Voting.state(), TaskState::Voting);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }
}
