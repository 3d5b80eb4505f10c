//! Synchronous HTTP agent
//!
//! Each capability is one POST whose response body is the agent's payload:
//!
//! | Call        | Request                       | Response           |
//! |-------------|-------------------------------|--------------------|
//! | `analyze`   | `POST /analyze {task}`        | `AnalysisPayload`  |
//! | `challenge` | `POST /challenge {task, analyses}` | `ChallengePayload` |
//! | `vote`      | `POST /vote {task, synthesis}` | `VotePayload`     |
//! | `health`    | `GET /health`                 | any 2xx            |

use super::http::AgentEndpoint;
use async_trait::async_trait;
use roundtable_application::{Agent, AgentError};
use roundtable_domain::{
    AgentAnalysis, AnalysisPayload, ChallengePayload, Synthesis, TaskInput, VotePayload,
};
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub task: &'a TaskInput,
}

#[derive(Serialize)]
pub(crate) struct ChallengeRequest<'a> {
    pub task: &'a TaskInput,
    pub analyses: &'a [AgentAnalysis],
}

#[derive(Serialize)]
pub(crate) struct VoteRequest<'a> {
    pub task: &'a TaskInput,
    pub synthesis: &'a Synthesis,
}

pub struct RemoteHttpAgent {
    name: String,
    domain: String,
    endpoint: AgentEndpoint,
}

impl RemoteHttpAgent {
    pub fn new(name: impl Into<String>, domain: impl Into<String>, endpoint: AgentEndpoint) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            endpoint,
        }
    }
}

#[async_trait]
impl Agent for RemoteHttpAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    async fn analyze(&self, task: &TaskInput) -> Result<AnalysisPayload, AgentError> {
        self.endpoint
            .post_json("analyze", &AnalyzeRequest { task })
            .await
    }

    async fn challenge(
        &self,
        task: &TaskInput,
        analyses: &[AgentAnalysis],
    ) -> Result<ChallengePayload, AgentError> {
        self.endpoint
            .post_json("challenge", &ChallengeRequest { task, analyses })
            .await
    }

    async fn vote(&self, task: &TaskInput, synthesis: &Synthesis) -> Result<VotePayload, AgentError> {
        self.endpoint
            .post_json("vote", &VoteRequest { task, synthesis })
            .await
    }

    async fn health(&self) -> bool {
        self.endpoint.probe("health").await
    }
}
