//! Run Round Table use case
//!
//! Drives one task through the deliberation phases. Agent calls within a
//! phase run concurrently; every phase is a barrier, so the next phase only
//! starts once every call of the current one has resolved.

use crate::config::EngineParams;
use crate::ports::agent::{Agent, AgentError};
use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::progress::ProgressNotifier;
use crate::ports::strategist::Strategist;
use crate::registry::{AgentEntry, AgentRegistry, RegistryError};
use crate::trust::TrustTracker;
use chrono::{DateTime, Utc};
use roundtable_domain::core::text::truncate_chars;
use roundtable_domain::evidence::sanitize_text;
use roundtable_domain::{
    AgentAnalysis, AgentCallRecord, Artifact, CallOutcome, Challenge, ChallengeReview,
    ConsensusReport, DegradedAgent, DomainError, EvidenceEnforcer, FailureKind, IdentityContext,
    Phase, PhaseWindow, RecordedRejection, RejectionReason, Synthesis, Task, TaskId, TaskInput,
    TaskRequest, TaskSnapshot, TaskState, UserFacingError, Vote,
    roundtable::synthesize,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Longest failure reason kept in an artifact
const MAX_REASON_CHARS: usize = 300;

/// Errors that end a task
#[derive(Error, Debug)]
pub enum RoundTableError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Quorum not met in {phase}: {participating} of {required} required agents")]
    QuorumNotMet {
        phase: Phase,
        participating: usize,
        required: usize,
    },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Task cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoundTableError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RoundTableError::Cancelled)
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            RoundTableError::InvalidRequest(_) => FailureKind::InvalidRequest,
            RoundTableError::QuorumNotMet { .. } => FailureKind::QuorumNotMet,
            RoundTableError::Registry(e) => match e.kind() {
                FailureKind::InvalidRequest => FailureKind::InvalidRequest,
                _ => FailureKind::RegistryOrStorageFailure,
            },
            RoundTableError::Storage(_) | RoundTableError::Internal(_) => {
                FailureKind::RegistryOrStorageFailure
            }
            RoundTableError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// The caller-safe form of this error. Internal detail stays in the logs.
    pub fn to_user_facing(&self) -> UserFacingError {
        let message = match self {
            RoundTableError::InvalidRequest(msg) => sanitize_text(msg),
            RoundTableError::QuorumNotMet {
                phase,
                participating,
                required,
            } => format!(
                "only {} of the {} required agents completed the {} phase",
                participating,
                required,
                phase.display_name()
            ),
            RoundTableError::Registry(_) => "the agent registry is unavailable".to_string(),
            RoundTableError::Storage(_) => "the result could not be stored".to_string(),
            RoundTableError::Cancelled => "the task was cancelled".to_string(),
            RoundTableError::Internal(_) => "an internal error occurred".to_string(),
        };
        UserFacingError::new(self.kind(), message)
    }
}

impl From<DomainError> for RoundTableError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidRequest(msg) => RoundTableError::InvalidRequest(msg),
            other => RoundTableError::Internal(other.to_string()),
        }
    }
}

// ==================== Agent calls ====================

/// Read-only phase input shared by every call of the phase
#[derive(Clone)]
enum PhaseRequest {
    Analyze,
    Challenge(Arc<Vec<AgentAnalysis>>),
    Vote(Arc<Synthesis>),
}

/// Agent output that passed the evidence enforcer
enum Accepted {
    Analysis(AgentAnalysis),
    Challenges(ChallengeReview),
    Vote(Vote),
}

#[derive(Error, Debug, Clone)]
enum CallFailure {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl CallFailure {
    fn is_retryable(&self) -> bool {
        match self {
            CallFailure::Rejected(_) => true,
            CallFailure::Agent(e) => e.is_retryable(),
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            CallFailure::Rejected(r) => r.kind(),
            CallFailure::Agent(e) => e.kind(),
        }
    }

    fn outcome(&self) -> CallOutcome {
        match self {
            CallFailure::Agent(AgentError::Timeout(_)) => CallOutcome::TimedOut,
            CallFailure::Agent(AgentError::Cancelled) => CallOutcome::Cancelled,
            CallFailure::Rejected(_) | CallFailure::Agent(AgentError::Malformed(_)) => {
                CallOutcome::Rejected {
                    kind: self.kind(),
                    reason: safe_reason(&self.to_string()),
                }
            }
            CallFailure::Agent(e) => CallOutcome::Failed {
                reason: safe_reason(&e.to_string()),
            },
        }
    }
}

/// One agent's resolved call in one phase
struct CallResult {
    agent: String,
    attempts: u8,
    /// Every rejection across attempts, the final one included
    rejections: Vec<RejectionReason>,
    resolved_at: DateTime<Utc>,
    result: Result<Accepted, CallFailure>,
}

fn safe_reason(text: &str) -> String {
    truncate_chars(&sanitize_text(text), MAX_REASON_CHARS)
}

async fn attempt(
    name: &str,
    agent: &dyn Agent,
    enforcer: &EvidenceEnforcer,
    input: &TaskInput,
    request: &PhaseRequest,
) -> Result<Accepted, CallFailure> {
    match request {
        PhaseRequest::Analyze => {
            let payload = agent.analyze(input).await?;
            Ok(Accepted::Analysis(
                enforcer.validate_analysis(name, input, &payload)?,
            ))
        }
        PhaseRequest::Challenge(analyses) => {
            let payload = agent.challenge(input, analyses).await?;
            Ok(Accepted::Challenges(
                enforcer.validate_challenges(name, &payload, analyses)?,
            ))
        }
        PhaseRequest::Vote(synthesis) => {
            let payload = agent.vote(input, synthesis).await?;
            Ok(Accepted::Vote(enforcer.validate_vote(name, &payload)?))
        }
    }
}

/// Call one agent, retrying once on invalid output, under one deadline.
async fn call_agent(
    name: String,
    agent: Arc<dyn Agent>,
    enforcer: Arc<EvidenceEnforcer>,
    input: Arc<TaskInput>,
    request: PhaseRequest,
    pool: Arc<Semaphore>,
    params: (std::time::Duration, u8),
) -> CallResult {
    let (timeout, max_attempts) = params;
    let mut attempts = 0u8;
    let mut rejections = Vec::new();

    let result = match pool.acquire_owned().await {
        Err(_) => Err(CallFailure::Agent(AgentError::Unavailable(
            "worker pool closed".into(),
        ))),
        Ok(_permit) => {
            let deadline = Instant::now() + timeout;
            loop {
                attempts += 1;
                let outcome = tokio::time::timeout_at(
                    deadline,
                    attempt(&name, agent.as_ref(), &enforcer, &input, &request),
                )
                .await
                .unwrap_or(Err(CallFailure::Agent(AgentError::Timeout(timeout))));

                if let Err(CallFailure::Rejected(reason)) = &outcome {
                    rejections.push(reason.clone());
                }
                match outcome {
                    Err(failure) if failure.is_retryable() && attempts < max_attempts => {
                        debug!(agent = %name, error = %failure, "Retrying invalid agent output");
                    }
                    other => break other,
                }
            }
        }
    };

    CallResult {
        agent: name,
        attempts,
        rejections,
        resolved_at: Utc::now(),
        result,
    }
}

// ==================== Task state ====================

/// Mutable state of one task execution. Only the engine writes it.
struct TaskRun<'a> {
    task: Task,
    input: Arc<TaskInput>,
    cancel: CancellationToken,
    progress: &'a dyn ProgressNotifier,
    snapshots: Option<watch::Sender<TaskSnapshot>>,
    active: Vec<Arc<AgentEntry>>,
    participants: Vec<String>,
    strategy_note: Option<String>,
    degraded: Vec<DegradedAgent>,
    rejections: Vec<RecordedRejection>,
    calls: Vec<AgentCallRecord>,
    phases: Vec<PhaseWindow>,
}

impl TaskRun<'_> {
    fn task_id(&self) -> &TaskId {
        &self.task.id
    }

    fn active_names(&self) -> Vec<String> {
        self.active.iter().map(|e| e.name().to_string()).collect()
    }

    fn publish(&self) {
        if let Some(tx) = &self.snapshots {
            let degraded = self.degraded.iter().map(|d| d.agent.clone()).collect();
            tx.send_replace(TaskSnapshot::of(&self.task).with_agents(self.active_names(), degraded));
        }
    }

    fn advance(&mut self, next: TaskState) -> Result<(), RoundTableError> {
        self.task.advance(next)?;
        debug!(task_id = %self.task.id, state = %next, "Task advanced");
        self.publish();
        Ok(())
    }

    /// Record a resolved call; failed agents are degraded for the rest of the task.
    fn record(&mut self, phase: Phase, call: &CallResult) {
        let outcome = match &call.result {
            Ok(_) => CallOutcome::Accepted,
            Err(failure) => failure.outcome(),
        };
        self.calls.push(AgentCallRecord {
            agent: call.agent.clone(),
            phase,
            attempts: call.attempts,
            resolved_at: call.resolved_at,
            outcome,
        });

        for reason in &call.rejections {
            self.rejections.push(RecordedRejection {
                agent: call.agent.clone(),
                phase,
                kind: reason.kind(),
                reason: safe_reason(&reason.to_string()),
            });
        }

        if let Err(failure) = &call.result {
            warn!(
                task_id = %self.task.id,
                agent = %call.agent,
                phase = %phase,
                error = %failure,
                "Agent degraded"
            );
            self.degraded.push(DegradedAgent {
                agent: call.agent.clone(),
                phase,
                kind: failure.kind(),
                reason: safe_reason(&failure.to_string()),
            });
            self.active.retain(|e| e.name() != call.agent);
        }
    }

    fn close_phase(&mut self, phase: Phase, started_at: DateTime<Utc>) {
        self.phases.push(PhaseWindow {
            phase,
            started_at,
            completed_at: Utc::now(),
        });
        self.progress.on_phase_complete(&self.task.id, phase);
    }
}

// ==================== Engine ====================

/// Handle to a task running in the background
pub struct TaskHandle {
    task_id: TaskId,
    snapshots: watch::Receiver<TaskSnapshot>,
    cancel: CancellationToken,
    join: JoinHandle<Result<Artifact, RoundTableError>>,
}

impl TaskHandle {
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Latest published snapshot. Never waits on the engine.
    pub fn snapshot(&self) -> TaskSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.snapshots.clone()
    }

    /// Cancel the task and every in-flight agent call it owns.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn wait(self) -> Result<Artifact, RoundTableError> {
        self.join
            .await
            .map_err(|e| RoundTableError::Internal(format!("task join error: {}", e)))?
    }
}

/// Use case for running a round table deliberation
pub struct RoundTableEngine {
    registry: Arc<AgentRegistry>,
    trust: Arc<TrustTracker>,
    store: Arc<dyn ArtifactStore>,
    enforcer: Arc<EvidenceEnforcer>,
    strategist: Option<Arc<dyn Strategist>>,
    params: EngineParams,
}

impl RoundTableEngine {
    pub fn new(
        registry: Arc<AgentRegistry>,
        trust: Arc<TrustTracker>,
        store: Arc<dyn ArtifactStore>,
        enforcer: EvidenceEnforcer,
        params: EngineParams,
    ) -> Self {
        Self {
            registry,
            trust,
            store,
            enforcer: Arc::new(enforcer),
            strategist: None,
            params,
        }
    }

    pub fn with_strategist(mut self, strategist: Arc<dyn Strategist>) -> Self {
        self.strategist = Some(strategist);
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Run a task to completion on the current task.
    pub async fn run(
        &self,
        identity: &IdentityContext,
        request: TaskRequest,
        cancel: CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Result<Artifact, RoundTableError> {
        let task = Task::new(identity, request)?;
        self.execute(task, identity, cancel, progress, None).await
    }

    /// Spawn a task and return a handle for polling and cancellation.
    pub fn submit(
        self: &Arc<Self>,
        identity: IdentityContext,
        request: TaskRequest,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Result<TaskHandle, RoundTableError> {
        let task = Task::new(&identity, request)?;
        let task_id = task.id.clone();
        let (tx, rx) = watch::channel(TaskSnapshot::of(&task));
        let cancel = CancellationToken::new();

        let engine = Arc::clone(self);
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            engine
                .execute(task, &identity, token, progress.as_ref(), Some(tx))
                .await
        });

        Ok(TaskHandle {
            task_id,
            snapshots: rx,
            cancel,
            join,
        })
    }

    async fn execute(
        &self,
        task: Task,
        identity: &IdentityContext,
        cancel: CancellationToken,
        progress: &dyn ProgressNotifier,
        snapshots: Option<watch::Sender<TaskSnapshot>>,
    ) -> Result<Artifact, RoundTableError> {
        let mut run = TaskRun {
            input: Arc::new(task.input()),
            task,
            cancel,
            progress,
            snapshots,
            active: Vec::new(),
            participants: Vec::new(),
            strategy_note: None,
            degraded: Vec::new(),
            rejections: Vec::new(),
            calls: Vec::new(),
            phases: Vec::new(),
        };
        info!(
            task_id = %run.task.id,
            tenant = %identity.tenant_id,
            "Starting round table"
        );

        match self.deliberate(&mut run, identity).await {
            Ok(artifact) => {
                info!(
                    task_id = %run.task.id,
                    outcome = %artifact.outcome,
                    consensus_rate = artifact.consensus_rate,
                    "Round table finalized"
                );
                progress.on_task_finished(&run.task.id, TaskState::Finalized);
                Ok(artifact)
            }
            Err(e) => {
                warn!(task_id = %run.task.id, error = %e, "Round table failed");
                if let Err(err) = run.task.fail(e.to_user_facing()) {
                    debug!(task_id = %run.task.id, error = %err, "Task already terminal");
                }
                run.publish();
                progress.on_task_finished(&run.task.id, TaskState::Failed);
                Err(e)
            }
        }
    }

    async fn deliberate(
        &self,
        run: &mut TaskRun<'_>,
        identity: &IdentityContext,
    ) -> Result<Artifact, RoundTableError> {
        run.active = self.registry.eligible_for(identity)?;
        debug!(task_id = %run.task.id, eligible = run.active.len(), "Dispatch snapshot taken");

        // Phase 0: Strategizing (optional)
        if let Some(strategist) = self.strategist.as_ref()
            && self.params.strategizing
            && !run.task.simple
        {
            self.phase_strategize(run, strategist.as_ref()).await?;
        }

        // Phase 1: Analyzing
        run.advance(TaskState::Analyzing)?;
        run.participants = run.active_names();
        let results = self
            .dispatch(run, Phase::Analyzing, PhaseRequest::Analyze)
            .await?;
        let mut analyses = Vec::new();
        for call in results {
            run.record(Phase::Analyzing, &call);
            if let Ok(Accepted::Analysis(analysis)) = call.result {
                analyses.push(analysis);
            }
        }
        self.check_quorum(Phase::Analyzing, analyses.len())?;

        // Phase 2: Challenging
        run.advance(TaskState::Challenging)?;
        let shared = Arc::new(analyses.clone());
        let results = self
            .dispatch(run, Phase::Challenging, PhaseRequest::Challenge(shared))
            .await?;
        let mut challenges: Vec<Challenge> = Vec::new();
        let mut challengers = 0usize;
        for call in results {
            run.record(Phase::Challenging, &call);
            if let Ok(Accepted::Challenges(review)) = call.result {
                challengers += 1;
                for reason in &review.rejected {
                    run.rejections.push(RecordedRejection {
                        agent: call.agent.clone(),
                        phase: Phase::Challenging,
                        kind: reason.kind(),
                        reason: safe_reason(&reason.to_string()),
                    });
                }
                challenges.extend(review.accepted);
            }
        }
        self.check_quorum(Phase::Challenging, challengers)?;

        // Phase 3: Synthesizing
        run.advance(TaskState::Synthesizing)?;
        let started_at = Utc::now();
        run.progress
            .on_phase_start(run.task_id(), Phase::Synthesizing, run.active.len());
        let surviving: Vec<String> = run.active_names();
        analyses.retain(|a| surviving.contains(&a.agent));
        challenges.retain(|c| surviving.contains(&c.agent));
        let synthesis = synthesize(&analyses, &challenges);
        debug!(
            task_id = %run.task.id,
            key = synthesis.key_findings.len(),
            minority = synthesis.minority_findings.len(),
            "Synthesis complete"
        );
        run.close_phase(Phase::Synthesizing, started_at);

        // Phase 4: Voting
        run.advance(TaskState::Voting)?;
        let results = self
            .dispatch(run, Phase::Voting, PhaseRequest::Vote(Arc::new(synthesis.clone())))
            .await?;
        let mut votes = Vec::new();
        for call in results {
            run.record(Phase::Voting, &call);
            if let Ok(Accepted::Vote(vote)) = call.result {
                votes.push(vote);
            }
        }
        self.check_quorum(Phase::Voting, votes.len())?;

        let voters: Vec<String> = votes.iter().map(|v| v.agent.clone()).collect();
        let trust = self.trust.scores(&run.task.tenant_id, &voters);
        let report = ConsensusReport::compute(&votes, &trust, self.params.consensus);
        let synthesis = synthesis.with_vote_rates(&report.tally);
        info!(
            task_id = %run.task.id,
            votes = %report.tally.summary(),
            weighted = ?report.weighted_approval,
            outcome = %report.outcome,
            "Votes counted"
        );

        let artifact = Artifact {
            task_id: run.task.id.clone(),
            tenant_id: run.task.tenant_id.clone(),
            submitted_by: run.task.submitted_by.clone(),
            query: run.task.query.clone(),
            tags: run.task.tags.clone(),
            participants: run.participants.clone(),
            strategy_note: run.strategy_note.clone(),
            analyses,
            challenges,
            synthesis,
            votes,
            consensus_rate: report.consensus_rate,
            approval_rate: report.tally.approval_rate(),
            weighted_approval: report.weighted_approval,
            outcome: report.outcome,
            requires_human_review: report.requires_human_review(),
            degraded: run.degraded.clone(),
            rejections: run.rejections.clone(),
            calls: run.calls.clone(),
            phases: run.phases.clone(),
            created_at: run.task.created_at,
            finalized_at: Utc::now(),
        };

        self.store.save(&artifact).await?;
        run.advance(TaskState::Finalized)?;
        Ok(artifact)
    }

    /// Phase 0: let the strategist narrow the agent set.
    ///
    /// A failing or empty plan keeps every eligible agent.
    async fn phase_strategize(
        &self,
        run: &mut TaskRun<'_>,
        strategist: &dyn Strategist,
    ) -> Result<(), RoundTableError> {
        run.advance(TaskState::Strategizing)?;
        let started_at = Utc::now();
        run.progress
            .on_phase_start(run.task_id(), Phase::Strategizing, run.active.len());

        let candidates: Vec<_> = run.active.iter().map(|e| e.descriptor().clone()).collect();
        let plan = tokio::select! {
            biased;
            _ = run.cancel.cancelled() => return Err(RoundTableError::Cancelled),
            plan = tokio::time::timeout(
                self.params.strategy_timeout,
                strategist.plan(&run.input, &candidates),
            ) => plan,
        };

        match plan {
            Ok(Ok(decision)) => {
                let chosen: Vec<Arc<AgentEntry>> = run
                    .active
                    .iter()
                    .filter(|e| decision.agents.iter().any(|n| n == e.name()))
                    .cloned()
                    .collect();
                if chosen.is_empty() {
                    warn!(task_id = %run.task.id, "Strategist chose no agents, keeping all");
                } else {
                    info!(
                        task_id = %run.task.id,
                        chosen = chosen.len(),
                        eligible = run.active.len(),
                        "Strategist narrowed agent set"
                    );
                    run.active = chosen;
                }
                run.strategy_note = decision.note.map(|n| safe_reason(&n));
            }
            Ok(Err(e)) => warn!(task_id = %run.task.id, error = %e, "Strategist failed"),
            Err(_) => warn!(task_id = %run.task.id, "Strategist timed out"),
        }

        run.close_phase(Phase::Strategizing, started_at);
        Ok(())
    }

    /// Fan a phase out to every active agent and wait for all of them.
    async fn dispatch(
        &self,
        run: &mut TaskRun<'_>,
        phase: Phase,
        request: PhaseRequest,
    ) -> Result<Vec<CallResult>, RoundTableError> {
        let started_at = Utc::now();
        info!(task_id = %run.task.id, phase = %phase, agents = run.active.len(), "Phase started");
        run.progress
            .on_phase_start(run.task_id(), phase, run.active.len());

        let permits = run.active.len().min(self.params.max_concurrency).max(1);
        let pool = Arc::new(Semaphore::new(permits));
        let limits = (self.params.call_timeout, self.params.max_attempts());

        let mut join_set = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, String> = HashMap::new();

        for entry in &run.active {
            let handle = join_set.spawn(call_agent(
                entry.name().to_string(),
                entry.agent(),
                Arc::clone(&self.enforcer),
                Arc::clone(&run.input),
                request.clone(),
                Arc::clone(&pool),
                limits,
            ));
            pending.insert(handle.id(), entry.name().to_string());
        }

        let mut results = Vec::with_capacity(pending.len());
        loop {
            let joined = tokio::select! {
                biased;
                _ = run.cancel.cancelled() => {
                    join_set.abort_all();
                    info!(task_id = %run.task.id, phase = %phase, "Cancelled in-flight agent calls");
                    return Err(RoundTableError::Cancelled);
                }
                joined = join_set.join_next_with_id() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            let call = match joined {
                Ok((id, call)) => {
                    pending.remove(&id);
                    call
                }
                Err(e) => {
                    warn!(task_id = %run.task.id, error = %e, "Agent call join error");
                    let agent = pending.remove(&e.id()).unwrap_or_default();
                    CallResult {
                        agent,
                        attempts: 1,
                        rejections: Vec::new(),
                        resolved_at: Utc::now(),
                        result: Err(CallFailure::Agent(AgentError::Unavailable(
                            "agent call aborted".into(),
                        ))),
                    }
                }
            };
            run.progress
                .on_agent_complete(run.task_id(), phase, &call.agent, call.result.is_ok());
            results.push(call);
        }

        results.sort_by(|a, b| a.agent.cmp(&b.agent));
        run.close_phase(phase, started_at);
        Ok(results)
    }

    fn check_quorum(&self, phase: Phase, participating: usize) -> Result<(), RoundTableError> {
        if participating < self.params.quorum {
            return Err(RoundTableError::QuorumNotMet {
                phase,
                participating,
                required: self.params.quorum,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_error_is_user_safe() {
        let err = RoundTableError::QuorumNotMet {
            phase: Phase::Analyzing,
            participating: 1,
            required: 2,
        };
        let user = err.to_user_facing();
        assert_eq!(user.kind, FailureKind::QuorumNotMet);
        assert!(user.message.contains("1 of the 2"));
    }

    #[test]
    fn test_storage_error_hides_detail() {
        let err = RoundTableError::Storage(StoreError::Unavailable("/var/data: EACCES".into()));
        let user = err.to_user_facing();
        assert_eq!(user.kind, FailureKind::RegistryOrStorageFailure);
        assert!(!user.message.contains("EACCES"));
    }

    #[test]
    fn test_call_failure_outcomes() {
        let timeout = CallFailure::Agent(AgentError::Timeout(std::time::Duration::from_secs(1)));
        assert_eq!(timeout.outcome(), CallOutcome::TimedOut);
        assert!(!timeout.is_retryable());

        let rejected = CallFailure::Rejected(RejectionReason::NoFindings);
        assert!(rejected.is_retryable());
        assert!(matches!(
            rejected.outcome(),
            CallOutcome::Rejected {
                kind: FailureKind::Validation,
                ..
            }
        ));

        let evidence = CallFailure::Rejected(RejectionReason::EvidenceNotFound { index: 0 });
        assert_eq!(evidence.kind(), FailureKind::EvidenceMissing);
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: RoundTableError = DomainError::InvalidRequest("empty".into()).into();
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
    }
}
