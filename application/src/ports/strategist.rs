//! Strategist port
//!
//! A strategist narrows the eligible agents to those relevant for a task.
//! It may only choose among the candidates it is given.

use crate::ports::agent::AgentError;
use async_trait::async_trait;
use roundtable_domain::core::text::tokenize;
use roundtable_domain::{AgentDescriptor, TaskInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDecision {
    /// Names of the chosen candidates
    pub agents: Vec<String>,
    pub note: Option<String>,
}

#[async_trait]
pub trait Strategist: Send + Sync {
    async fn plan(
        &self,
        task: &TaskInput,
        candidates: &[AgentDescriptor],
    ) -> Result<StrategyDecision, AgentError>;
}

/// Picks candidates whose domain or capabilities share words with the task
///
/// Core agents (owned by the system tenant) are always kept.
pub struct TagStrategist;

#[async_trait]
impl Strategist for TagStrategist {
    async fn plan(
        &self,
        task: &TaskInput,
        candidates: &[AgentDescriptor],
    ) -> Result<StrategyDecision, AgentError> {
        let mut wanted = tokenize(&task.query);
        for tag in &task.tags {
            wanted.extend(tokenize(tag));
        }

        let system = roundtable_domain::TenantId::system();
        let agents: Vec<String> = candidates
            .iter()
            .filter(|c| c.owner.tenant_id == system || !c.tags().is_disjoint(&wanted))
            .map(|c| c.name.clone())
            .collect();

        let note = format!(
            "selected {} of {} candidates by topic overlap",
            agents.len(),
            candidates.len()
        );
        Ok(StrategyDecision {
            agents,
            note: Some(note),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{AgentOwner, TaskId};

    #[tokio::test]
    async fn test_tag_strategist_keeps_core_and_relevant() {
        let candidates = vec![
            AgentDescriptor::local("skeptic", "adversarial review"),
            AgentDescriptor::local("tax", "corporate taxation")
                .with_owner(AgentOwner::new("acme", "alice")),
            AgentDescriptor::local("legal", "contract law")
                .with_owner(AgentOwner::new("acme", "alice")),
        ];
        let task = TaskInput::new(TaskId::new("t"), "Review the supplier contract");
        let decision = TagStrategist.plan(&task, &candidates).await.unwrap();
        assert_eq!(decision.agents, vec!["skeptic", "legal"]);
    }
}
