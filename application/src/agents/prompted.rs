//! LLM-backed in-process agent

use super::prompt::{AgentRole, RoundTablePromptTemplate};
use super::response_parser::extract_json;
use crate::ports::agent::{Agent, AgentError};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use async_trait::async_trait;
use roundtable_domain::{
    AgentAnalysis, AnalysisPayload, ChallengePayload, Synthesis, TaskInput, VotePayload,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Agent that answers each phase by prompting a model
///
/// The reply only has to contain JSON of the right shape; whether its
/// content is acceptable is decided later by the evidence enforcer.
pub struct PromptedAgent {
    role: AgentRole,
    gateway: Arc<dyn LlmGateway>,
}

impl PromptedAgent {
    pub fn new(role: AgentRole, gateway: Arc<dyn LlmGateway>) -> Self {
        Self { role, gateway }
    }

    pub fn role(&self) -> &AgentRole {
        &self.role
    }

    async fn ask<T: DeserializeOwned>(&self, prompt: String) -> Result<T, AgentError> {
        let system = RoundTablePromptTemplate::system(&self.role);
        let reply = self
            .gateway
            .complete(&system, &prompt)
            .await
            .map_err(gateway_error)?;
        debug!(agent = %self.role.name, chars = reply.len(), "Model replied");

        let value = extract_json(&reply)
            .ok_or_else(|| AgentError::Malformed("reply contains no JSON".into()))?;
        serde_json::from_value(value).map_err(|e| AgentError::Malformed(e.to_string()))
    }
}

fn gateway_error(e: GatewayError) -> AgentError {
    match e {
        GatewayError::ConnectionError(msg) | GatewayError::RequestFailed(msg) => {
            AgentError::Transport(msg)
        }
        GatewayError::Timeout => AgentError::Transport("model request timed out".into()),
        GatewayError::Other(msg) => AgentError::Unavailable(msg),
    }
}

#[async_trait]
impl Agent for PromptedAgent {
    fn name(&self) -> &str {
        &self.role.name
    }

    fn domain(&self) -> &str {
        &self.role.domain
    }

    async fn analyze(&self, task: &TaskInput) -> Result<AnalysisPayload, AgentError> {
        self.ask(RoundTablePromptTemplate::analysis(&self.role, task))
            .await
    }

    async fn challenge(
        &self,
        task: &TaskInput,
        analyses: &[AgentAnalysis],
    ) -> Result<ChallengePayload, AgentError> {
        self.ask(RoundTablePromptTemplate::challenge(&self.role, task, analyses))
            .await
    }

    async fn vote(&self, task: &TaskInput, synthesis: &Synthesis) -> Result<VotePayload, AgentError> {
        self.ask(RoundTablePromptTemplate::vote(&self.role, task, synthesis))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::TaskId;
    use std::sync::Mutex;

    struct CannedGateway {
        replies: Mutex<Vec<Result<String, GatewayError>>>,
    }

    impl CannedGateway {
        fn new(replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
            })
        }
    }

    #[async_trait]
    impl LlmGateway for CannedGateway {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, GatewayError> {
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn agent(gateway: Arc<CannedGateway>) -> PromptedAgent {
        PromptedAgent::new(AgentRole::new("skeptic", "assumptions", "Doubt."), gateway)
    }

    fn task() -> TaskInput {
        TaskInput::new(TaskId::new("t1"), "Revenue grew 40% in Q3.")
    }

    #[tokio::test]
    async fn test_analyze_parses_fenced_reply() {
        let reply = "```json\n{\"agent_id\":\"skeptic\",\"findings\":[{\"claim\":\"Growth is high\",\"evidence\":\"Revenue grew 40%\",\"confidence\":0.8}]}\n```";
        let agent = agent(CannedGateway::new(vec![Ok(reply.into())]));
        let payload = agent.analyze(&task()).await.unwrap();
        assert_eq!(payload.findings.len(), 1);
        assert_eq!(payload.findings[0].confidence, Some(0.8));
    }

    #[tokio::test]
    async fn test_prose_reply_is_malformed() {
        let agent = agent(CannedGateway::new(vec![Ok("I approve.".into())]));
        let err = agent.analyze(&task()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_transport() {
        let agent = agent(CannedGateway::new(vec![Err(GatewayError::ConnectionError(
            "refused".into(),
        ))]));
        let err = agent.analyze(&task()).await.unwrap_err();
        assert_eq!(err, AgentError::Transport("refused".into()));
    }
}
