//! Core safety agents
//!
//! Three roles that sit at every round table unless disabled: a skeptic, a
//! coverage reviewer and an evidence grader.

use super::prompt::AgentRole;
use super::prompted::PromptedAgent;
use crate::ports::agent::Agent;
use crate::ports::llm_gateway::LlmGateway;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreRole {
    Skeptic,
    Quality,
    Evidence,
}

impl CoreRole {
    pub const ALL: [CoreRole; 3] = [CoreRole::Skeptic, CoreRole::Quality, CoreRole::Evidence];

    pub fn name(&self) -> &'static str {
        match self {
            CoreRole::Skeptic => "skeptic",
            CoreRole::Quality => "quality",
            CoreRole::Evidence => "evidence",
        }
    }

    pub fn domain(&self) -> &'static str {
        match self {
            CoreRole::Skeptic => "critical thinking and assumption validation",
            CoreRole::Quality => "completeness and requirement coverage",
            CoreRole::Evidence => "claim verification and source validation",
        }
    }

    fn charter(&self) -> &'static str {
        match self {
            CoreRole::Skeptic => {
                "Keep the other reviewers honest. Point out unsupported assumptions, \
                 logical fallacies and confident claims resting on thin evidence. \
                 Object with a concrete flaw, not bare disagreement, and concede \
                 reasoning that holds up. Do not vote with the majority for its own sake."
            }
            CoreRole::Quality => {
                "Map the requirements and constraints stated in the task. Report the \
                 ones nobody covered, plus missing edge cases and error scenarios. \
                 Name the exact requirement that is missing. Judge coverage, not style."
            }
            CoreRole::Evidence => {
                "Grade how well each claim is supported: direct quotes are strong, \
                 inferences moderate, opinion weak. Flag inferences stated as facts, \
                 circular reasoning and correlation read as causation. Unsupported \
                 means unverified, not false."
            }
        }
    }

    pub fn role(&self) -> AgentRole {
        AgentRole::new(self.name(), self.domain(), self.charter())
    }
}

/// One prompted agent per core role, all sharing `gateway`.
pub fn core_agents(gateway: Arc<dyn LlmGateway>) -> Vec<Arc<dyn Agent>> {
    CoreRole::ALL
        .iter()
        .map(|role| {
            Arc::new(PromptedAgent::new(role.role(), Arc::clone(&gateway))) as Arc<dyn Agent>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;

    struct NullGateway;

    #[async_trait]
    impl LlmGateway for NullGateway {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, GatewayError> {
            Err(GatewayError::Other("offline".into()))
        }
    }

    #[test]
    fn test_core_agents_have_distinct_names() {
        let agents = core_agents(Arc::new(NullGateway));
        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["skeptic", "quality", "evidence"]);
        assert_eq!(agents[2].domain(), CoreRole::Evidence.domain());
    }
}
