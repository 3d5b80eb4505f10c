//! Shared test doubles for round table scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use roundtable_application::{
    Agent, AgentError, AgentRegistry, EngineParams, InMemoryArtifactStore, RegistryOptions,
    RoundTableEngine, StaticHostResolver, TrustTracker,
};
use roundtable_domain::{
    AgentAnalysis, AnalysisPayload, ChallengeItemPayload, ChallengePayload, EvidenceEnforcer,
    FindingPayload, Synthesis, TaskInput, VotePayload,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const REPORT: &str = "Q3 revenue grew 40% year over year. Operating costs rose 12% \
     on higher freight prices. The board approved a new credit facility of $50M.";

/// In-process agent with a fixed script
pub struct ScriptedAgent {
    name: String,
    domain: String,
    findings: Vec<FindingPayload>,
    objections: Vec<ChallengeItemPayload>,
    decision: String,
    analysis_delay: Duration,
    analysis_error: Option<AgentError>,
    vote_error: Option<AgentError>,
    /// Analysis calls answered with prose before the script starts
    malformed_replies: usize,
    analysis_calls: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            domain: "financial review".to_string(),
            findings: vec![FindingPayload::new(
                "Revenue growth was strong",
                "revenue grew 40% year over year",
            )],
            objections: Vec::new(),
            decision: "approve".to_string(),
            analysis_delay: Duration::ZERO,
            analysis_error: None,
            vote_error: None,
            malformed_replies: 0,
            analysis_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn citing(mut self, claim: &str, quote: &str) -> Self {
        self.findings = vec![FindingPayload::new(claim, quote)];
        self
    }

    pub fn also_citing(mut self, claim: &str, quote: &str) -> Self {
        self.findings.push(FindingPayload::new(claim, quote));
        self
    }

    pub fn objecting(mut self, target: &str, rationale: &str) -> Self {
        self.objections.push(ChallengeItemPayload::new(target, rationale));
        self
    }

    pub fn voting(mut self, decision: &str) -> Self {
        self.decision = decision.to_string();
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.analysis_delay = delay;
        self
    }

    pub fn failing_analysis(mut self, error: AgentError) -> Self {
        self.analysis_error = Some(error);
        self
    }

    pub fn failing_vote(mut self, error: AgentError) -> Self {
        self.vote_error = Some(error);
        self
    }

    pub fn malformed_first(mut self, replies: usize) -> Self {
        self.malformed_replies = replies;
        self
    }

    pub fn analysis_calls(&self) -> usize {
        self.analysis_calls.load(Ordering::SeqCst)
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    async fn analyze(&self, _task: &TaskInput) -> Result<AnalysisPayload, AgentError> {
        let call = self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        if !self.analysis_delay.is_zero() {
            tokio::time::sleep(self.analysis_delay).await;
        }
        if let Some(e) = &self.analysis_error {
            return Err(e.clone());
        }
        if call < self.malformed_replies {
            return Err(AgentError::Malformed("reply contains no JSON".into()));
        }
        Ok(AnalysisPayload::new(&self.name, self.findings.clone()))
    }

    async fn challenge(
        &self,
        _task: &TaskInput,
        _analyses: &[AgentAnalysis],
    ) -> Result<ChallengePayload, AgentError> {
        Ok(ChallengePayload {
            objections: self.objections.clone(),
            ..ChallengePayload::empty(&self.name)
        })
    }

    async fn vote(&self, _task: &TaskInput, _synthesis: &Synthesis) -> Result<VotePayload, AgentError> {
        if let Some(e) = &self.vote_error {
            return Err(e.clone());
        }
        Ok(VotePayload::new(
            &self.name,
            &self.decision,
            format!("{} reviewed the synthesis", self.name),
        ))
    }
}

pub struct Harness {
    pub registry: Arc<AgentRegistry>,
    pub trust: Arc<TrustTracker>,
    pub store: Arc<InMemoryArtifactStore>,
    pub engine: Arc<RoundTableEngine>,
}

pub fn registry() -> Arc<AgentRegistry> {
    Arc::new(AgentRegistry::new(
        Arc::new(StaticHostResolver::new()),
        RegistryOptions::default(),
    ))
}

/// Engine over public, system-owned agents.
pub fn harness(agents: Vec<Arc<ScriptedAgent>>, params: EngineParams) -> Harness {
    let registry = registry();
    for agent in agents {
        registry.register_local(agent).unwrap();
    }
    harness_with(registry, Arc::new(TrustTracker::default()), params)
}

pub fn harness_with(
    registry: Arc<AgentRegistry>,
    trust: Arc<TrustTracker>,
    params: EngineParams,
) -> Harness {
    let store = Arc::new(InMemoryArtifactStore::new());
    let engine = Arc::new(RoundTableEngine::new(
        Arc::clone(&registry),
        Arc::clone(&trust),
        store.clone(),
        EvidenceEnforcer::default(),
        params,
    ));
    Harness {
        registry,
        trust,
        store,
        engine,
    }
}
