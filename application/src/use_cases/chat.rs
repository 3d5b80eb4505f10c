//! Chat use case
//!
//! Answers a question with up to three relevant agents and escalates to a
//! full round table when they disagree or too few of them answer.

use crate::config::ChatParams;
use crate::ports::agent::AgentError;
use crate::registry::{AgentEntry, AgentRegistry, RegistryError};
use crate::trust::TrustTracker;
use roundtable_domain::chat::disagreement;
use roundtable_domain::core::text::tokenize;
use roundtable_domain::roundtable::task::MAX_QUERY_CHARS;
use roundtable_domain::{
    AgentAnalysis, ChatRequest, ChatResponse, EscalationReason, EvidenceEnforcer, FailureKind,
    IdentityContext, RejectionReason, TaskId, TaskInput,
};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const ESCALATION_HINT: &str = "Run a full round table before relying on this answer.";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Chat cancelled")]
    Cancelled,
}

impl ChatError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ChatError::InvalidRequest(_) => FailureKind::InvalidRequest,
            ChatError::Registry(_) => FailureKind::RegistryOrStorageFailure,
            ChatError::Cancelled => FailureKind::Cancelled,
        }
    }
}

#[derive(Error, Debug)]
enum ChatCallError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Rejected(#[from] RejectionReason),
}

pub struct ChatOrchestrator {
    registry: Arc<AgentRegistry>,
    trust: Arc<TrustTracker>,
    enforcer: Arc<EvidenceEnforcer>,
    params: ChatParams,
}

impl ChatOrchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        trust: Arc<TrustTracker>,
        enforcer: EvidenceEnforcer,
        params: ChatParams,
    ) -> Self {
        Self {
            registry,
            trust,
            enforcer: Arc::new(enforcer),
            params,
        }
    }

    /// Relevant, visible, healthy agents, most trusted first.
    pub fn select_agents(
        &self,
        identity: &IdentityContext,
        request: &ChatRequest,
    ) -> Result<Vec<Arc<AgentEntry>>, ChatError> {
        let mut wanted = tokenize(&request.query);
        for tag in &request.tags {
            wanted.extend(tokenize(tag));
        }

        let mut scored: Vec<(f64, Arc<AgentEntry>)> = self
            .registry
            .eligible_for(identity)?
            .into_iter()
            .filter(|e| !e.descriptor().tags().is_disjoint(&wanted))
            .map(|e| (self.trust.score(&identity.tenant_id, e.name()), e))
            .collect();

        scored.sort_by(|a, b| match b.0.total_cmp(&a.0) {
            Ordering::Equal => a.1.name().cmp(b.1.name()),
            other => other,
        });
        scored.truncate(self.params.max_agents);
        Ok(scored.into_iter().map(|(_, e)| e).collect())
    }

    pub async fn respond(
        &self,
        identity: &IdentityContext,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, ChatError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ChatError::InvalidRequest("query must not be empty".into()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(ChatError::InvalidRequest(format!(
                "query exceeds {} characters",
                MAX_QUERY_CHARS
            )));
        }

        let selected = self.select_agents(identity, &request)?;
        if selected.is_empty() {
            info!(tenant = %identity.tenant_id, "No relevant agents for chat");
            return Ok(ChatResponse {
                answer: format!("No agent covers this question. {}", ESCALATION_HINT),
                escalate: true,
                escalation_reason: Some(EscalationReason::NoRelevantAgents),
                responders: Vec::new(),
                degraded: Vec::new(),
                disagreement: 0.0,
            });
        }

        let order: Vec<String> = selected.iter().map(|e| e.name().to_string()).collect();
        debug!(agents = ?order, "Chat agents selected");

        let mut input = TaskInput::new(TaskId::generate(), query);
        input.tags = request.tags.clone();
        let input = Arc::new(input);

        let mut join_set = JoinSet::new();
        let mut pending = HashMap::new();
        for entry in &selected {
            let name = entry.name().to_string();
            let agent = entry.agent();
            let enforcer = Arc::clone(&self.enforcer);
            let input = Arc::clone(&input);
            let timeout = self.params.timeout;

            let handle = join_set.spawn(async move {
                let call = async {
                    let payload = agent.analyze(&input).await?;
                    Ok::<_, ChatCallError>(enforcer.validate_analysis(&name, &input, &payload)?)
                };
                let result = match tokio::time::timeout(timeout, call).await {
                    Ok(r) => r,
                    Err(_) => Err(ChatCallError::Agent(AgentError::Timeout(timeout))),
                };
                (name, result)
            });
            pending.insert(handle.id(), entry.name().to_string());
        }

        let mut answers: Vec<AgentAnalysis> = Vec::new();
        let mut degraded = Vec::new();
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    join_set.abort_all();
                    return Err(ChatError::Cancelled);
                }
                joined = join_set.join_next_with_id() => joined,
            };
            let Some(joined) = joined else {
                break;
            };
            match joined {
                Ok((id, (_, Ok(analysis)))) => {
                    pending.remove(&id);
                    answers.push(analysis);
                }
                Ok((id, (name, Err(e)))) => {
                    pending.remove(&id);
                    warn!(agent = %name, error = %e, "Chat agent failed");
                    degraded.push(name);
                }
                Err(e) => {
                    if let Some(name) = pending.remove(&e.id()) {
                        warn!(agent = %name, error = %e, "Chat agent task failed");
                        degraded.push(name);
                    }
                }
            }
        }

        // Most trusted responder first
        answers.sort_by_key(|a| order.iter().position(|n| *n == a.agent));
        degraded.sort();

        let token_sets: Vec<BTreeSet<String>> = answers
            .iter()
            .map(|a| {
                a.findings
                    .iter()
                    .flat_map(|f| tokenize(&f.claim))
                    .collect()
            })
            .collect();
        let score = disagreement(&token_sets);

        let escalation_reason = if answers.len() < self.params.min_responders {
            Some(EscalationReason::InsufficientResponders {
                responded: answers.len(),
                required: self.params.min_responders,
            })
        } else if score > self.params.disagreement_threshold {
            Some(EscalationReason::Disagreement {
                score,
                threshold: self.params.disagreement_threshold,
            })
        } else {
            None
        };

        let answer = draft_answer(answers.first(), escalation_reason.as_ref());
        info!(
            tenant = %identity.tenant_id,
            responders = answers.len(),
            disagreement = score,
            escalate = escalation_reason.is_some(),
            "Chat answered"
        );

        Ok(ChatResponse {
            answer,
            escalate: escalation_reason.is_some(),
            escalation_reason,
            responders: answers.into_iter().map(|a| a.agent).collect(),
            degraded,
            disagreement: score,
        })
    }
}

fn draft_answer(best: Option<&AgentAnalysis>, escalation: Option<&EscalationReason>) -> String {
    let body = match best {
        Some(analysis) => analysis
            .findings
            .iter()
            .map(|f| format!("- {} (\"{}\")", f.claim, f.evidence.quote))
            .collect::<Vec<_>>()
            .join("\n"),
        None => "No agent produced an acceptable answer.".to_string(),
    };
    match escalation {
        Some(reason) => format!("Draft ({}). {}\n\n{}", reason, ESCALATION_HINT, body),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent::Agent;
    use crate::ports::host_resolver::StaticHostResolver;
    use crate::registry::RegistryOptions;
    use async_trait::async_trait;
    use roundtable_domain::{
        AnalysisPayload, ChallengePayload, FeedbackSignal, FindingPayload, Role, Synthesis,
        VotePayload,
    };
    use std::time::Duration;

    const QUESTION: &str = "Does the supplier contract allow early termination with notice?";

    struct ChatAgent {
        name: String,
        domain: String,
        claim: Option<String>,
        delay: Duration,
        panics: bool,
    }

    impl ChatAgent {
        fn answering(name: &str, domain: &str, claim: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                domain: domain.into(),
                claim: Some(claim.into()),
                delay: Duration::ZERO,
                panics: false,
            })
        }
    }

    #[async_trait]
    impl Agent for ChatAgent {
        fn name(&self) -> &str {
            &self.name
        }
        fn domain(&self) -> &str {
            &self.domain
        }
        async fn analyze(&self, _task: &TaskInput) -> Result<AnalysisPayload, AgentError> {
            tokio::time::sleep(self.delay).await;
            if self.panics {
                panic!("{} crashed", self.name);
            }
            match &self.claim {
                Some(claim) => Ok(AnalysisPayload::new(
                    &self.name,
                    vec![FindingPayload::new(claim, "early termination with notice")],
                )),
                None => Err(AgentError::Unavailable("down".into())),
            }
        }
        async fn challenge(
            &self,
            _task: &TaskInput,
            _analyses: &[AgentAnalysis],
        ) -> Result<ChallengePayload, AgentError> {
            Ok(ChallengePayload::empty(&self.name))
        }
        async fn vote(
            &self,
            _task: &TaskInput,
            _synthesis: &Synthesis,
        ) -> Result<VotePayload, AgentError> {
            Ok(VotePayload::new(&self.name, "approve", "fine"))
        }
    }

    fn setup(agents: Vec<Arc<ChatAgent>>) -> (ChatOrchestrator, Arc<TrustTracker>) {
        let registry = Arc::new(AgentRegistry::new(
            Arc::new(StaticHostResolver::new()),
            RegistryOptions::default(),
        ));
        for agent in agents {
            registry.register_local(agent).unwrap();
        }
        let trust = Arc::new(TrustTracker::default());
        let chat = ChatOrchestrator::new(
            registry,
            Arc::clone(&trust),
            EvidenceEnforcer::default(),
            ChatParams::default(),
        );
        (chat, trust)
    }

    fn member() -> IdentityContext {
        IdentityContext::new("acme", "alice", Role::Member)
    }

    #[tokio::test]
    async fn test_agreeing_agents_do_not_escalate() {
        let (chat, _) = setup(vec![
            ChatAgent::answering("legal", "contract law", "Termination requires written notice"),
            ChatAgent::answering("procure", "supplier contract", "Termination requires notice"),
        ]);
        let response = chat
            .respond(&member(), ChatRequest::new(QUESTION), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!response.escalate);
        assert_eq!(response.responders.len(), 2);
        assert!(response.answer.contains("Termination requires"));
    }

    #[tokio::test]
    async fn test_disagreement_escalates() {
        let (chat, _) = setup(vec![
            ChatAgent::answering("legal", "contract law", "Termination requires written notice"),
            ChatAgent::answering("procure", "supplier contract", "Pricing escalates annually"),
        ]);
        let response = chat
            .respond(&member(), ChatRequest::new(QUESTION), &CancellationToken::new())
            .await
            .unwrap();
        assert!(response.escalate);
        assert!(matches!(
            response.escalation_reason,
            Some(EscalationReason::Disagreement { .. })
        ));
    }

    #[tokio::test]
    async fn test_single_responder_escalates() {
        let down = Arc::new(ChatAgent {
            name: "procure".into(),
            domain: "supplier contract".into(),
            claim: None,
            delay: Duration::ZERO,
            panics: false,
        });
        let (chat, _) = setup(vec![
            ChatAgent::answering("legal", "contract law", "Termination requires written notice"),
            down,
        ]);
        let response = chat
            .respond(&member(), ChatRequest::new(QUESTION), &CancellationToken::new())
            .await
            .unwrap();
        assert!(response.escalate);
        assert_eq!(response.degraded, vec!["procure"]);
        assert_eq!(
            response.escalation_reason,
            Some(EscalationReason::InsufficientResponders {
                responded: 1,
                required: 2
            })
        );
    }

    #[tokio::test]
    async fn test_crashed_agent_is_reported_degraded() {
        let crashing = Arc::new(ChatAgent {
            name: "procure".into(),
            domain: "supplier contract".into(),
            claim: None,
            delay: Duration::ZERO,
            panics: true,
        });
        let (chat, _) = setup(vec![
            ChatAgent::answering("legal", "contract law", "Termination requires written notice"),
            crashing,
        ]);
        let response = chat
            .respond(&member(), ChatRequest::new(QUESTION), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.responders, vec!["legal"]);
        assert_eq!(response.degraded, vec!["procure"]);
        assert!(response.escalate);
    }

    #[tokio::test]
    async fn test_irrelevant_agents_not_selected() {
        let (chat, _) = setup(vec![ChatAgent::answering("tax", "corporate taxation", "x")]);
        let response = chat
            .respond(&member(), ChatRequest::new(QUESTION), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            response.escalation_reason,
            Some(EscalationReason::NoRelevantAgents)
        );
    }

    #[test]
    fn test_selection_prefers_trusted_and_caps_at_three() {
        let (chat, trust) = setup(vec![
            ChatAgent::answering("a-contract", "contract", "x"),
            ChatAgent::answering("b-contract", "contract", "x"),
            ChatAgent::answering("c-contract", "contract", "x"),
            ChatAgent::answering("d-contract", "contract", "x"),
        ]);
        let tenant = member().tenant_id;
        for _ in 0..5 {
            trust.update(&tenant, "d-contract", FeedbackSignal::Accept);
        }
        let names: Vec<String> = chat
            .select_agents(&member(), &ChatRequest::new(QUESTION))
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["d-contract", "a-contract", "b-contract"]);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (chat, _) = setup(vec![]);
        let err = chat
            .respond(&member(), ChatRequest::new("  "), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
    }
}
