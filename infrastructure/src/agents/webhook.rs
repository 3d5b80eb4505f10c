//! Asynchronous webhook agent
//!
//! The agent acknowledges `POST /jobs` and later posts its payload, wrapped
//! in a signed [`CallbackEnvelope`](crate::callback::CallbackEnvelope), to
//! the callback URL carried in the job.

use super::http::AgentEndpoint;
use crate::callback::{CallbackError, CallbackHub};
use async_trait::async_trait;
use roundtable_application::{Agent, AgentError};
use roundtable_domain::{
    AgentAnalysis, AnalysisPayload, ChallengePayload, Synthesis, TaskInput, VotePayload,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum JobKind {
    Analyze,
    Challenge,
    Vote,
}

#[derive(Serialize)]
struct Job<'a> {
    kind: JobKind,
    callback_id: &'a str,
    callback_url: &'a str,
    task: &'a TaskInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    analyses: Option<&'a [AgentAnalysis]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesis: Option<&'a Synthesis>,
}

pub struct WebhookAgent {
    name: String,
    domain: String,
    endpoint: AgentEndpoint,
    hub: Arc<CallbackHub>,
    callback_ttl: Duration,
}

impl WebhookAgent {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        endpoint: AgentEndpoint,
        hub: Arc<CallbackHub>,
        callback_ttl: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            endpoint,
            hub,
            callback_ttl,
        }
    }

    async fn submit<T: DeserializeOwned>(
        &self,
        kind: JobKind,
        task: &TaskInput,
        analyses: Option<&[AgentAnalysis]>,
        synthesis: Option<&Synthesis>,
    ) -> Result<T, AgentError> {
        let pending = self.hub.expect(&self.name, self.callback_ttl);
        let job = Job {
            kind,
            callback_id: &pending.id,
            callback_url: &pending.url,
            task,
            analyses,
            synthesis,
        };
        self.endpoint.post_ack("jobs", &job).await?;
        debug!(agent = %self.name, job = ?kind, "Webhook job accepted");

        let payload = pending.wait().await.map_err(|e| match e {
            CallbackError::Expired(_) => AgentError::Timeout(self.callback_ttl),
            other => AgentError::Transport(other.to_string()),
        })?;
        serde_json::from_value(payload).map_err(|e| AgentError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl Agent for WebhookAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    async fn analyze(&self, task: &TaskInput) -> Result<AnalysisPayload, AgentError> {
        self.submit(JobKind::Analyze, task, None, None).await
    }

    async fn challenge(
        &self,
        task: &TaskInput,
        analyses: &[AgentAnalysis],
    ) -> Result<ChallengePayload, AgentError> {
        self.submit(JobKind::Challenge, task, Some(analyses), None)
            .await
    }

    async fn vote(&self, task: &TaskInput, synthesis: &Synthesis) -> Result<VotePayload, AgentError> {
        self.submit(JobKind::Vote, task, None, Some(synthesis)).await
    }

    async fn health(&self) -> bool {
        self.endpoint.probe("health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::TaskId;

    #[test]
    fn test_job_shape() {
        let task = TaskInput::new(TaskId::new("t-9"), "Assess the vendor");
        let job = Job {
            kind: JobKind::Analyze,
            callback_id: "cb-1",
            callback_url: "https://rt.example.com/callbacks/cb-1",
            task: &task,
            analyses: None,
            synthesis: None,
        };
        let body = serde_json::to_value(&job).unwrap();
        assert_eq!(body["kind"], "analyze");
        assert_eq!(body["callback_id"], "cb-1");
        assert!(body.get("analyses").is_none());
        assert!(body.get("synthesis").is_none());
    }
}
