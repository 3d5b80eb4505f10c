//! Progress notification port
//!
//! Defines the interface for reporting progress during a round table.

use roundtable_domain::{Phase, TaskId, TaskState};
use tracing::info;

/// Callback for progress updates during a round table
///
/// Implementations can display progress in various ways (console, logs,
/// a web UI). Callbacks run on the engine task and must not block.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, task_id: &TaskId, phase: Phase, total_agents: usize);

    /// Called when an agent call resolves within a phase
    fn on_agent_complete(&self, task_id: &TaskId, phase: Phase, agent: &str, accepted: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, task_id: &TaskId, phase: Phase);

    /// Called once the task reaches a terminal state
    fn on_task_finished(&self, _task_id: &TaskId, _state: TaskState) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _task_id: &TaskId, _phase: Phase, _total_agents: usize) {}
    fn on_agent_complete(&self, _task_id: &TaskId, _phase: Phase, _agent: &str, _accepted: bool) {}
    fn on_phase_complete(&self, _task_id: &TaskId, _phase: Phase) {}
}

/// Progress notifier that writes structured log events
pub struct TracingProgress;

impl ProgressNotifier for TracingProgress {
    fn on_phase_start(&self, task_id: &TaskId, phase: Phase, total_agents: usize) {
        info!(task_id = %task_id, phase = %phase, agents = total_agents, "Phase started");
    }

    fn on_agent_complete(&self, task_id: &TaskId, phase: Phase, agent: &str, accepted: bool) {
        info!(task_id = %task_id, phase = %phase, agent, accepted, "Agent call resolved");
    }

    fn on_phase_complete(&self, task_id: &TaskId, phase: Phase) {
        info!(task_id = %task_id, phase = %phase, "Phase complete");
    }

    fn on_task_finished(&self, task_id: &TaskId, state: TaskState) {
        info!(task_id = %task_id, state = %state, "Task finished");
    }
}
