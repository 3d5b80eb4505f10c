//! Record Feedback use case
//!
//! Applies a user's verdict on an agent's contribution to that agent's
//! trust score within the user's tenant.

use crate::registry::{AgentRegistry, RegistryError};
use crate::trust::TrustTracker;
use roundtable_domain::{FailureKind, FeedbackSignal, IdentityContext};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl FeedbackError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FeedbackError::Registry(e) => e.kind(),
        }
    }
}

pub struct RecordFeedbackUseCase {
    registry: Arc<AgentRegistry>,
    trust: Arc<TrustTracker>,
}

impl RecordFeedbackUseCase {
    pub fn new(registry: Arc<AgentRegistry>, trust: Arc<TrustTracker>) -> Self {
        Self { registry, trust }
    }

    /// Apply `signal` to `agent` and return the new score.
    ///
    /// Only agents visible to the requester can receive feedback.
    pub fn execute(
        &self,
        identity: &IdentityContext,
        agent: &str,
        signal: FeedbackSignal,
    ) -> Result<f64, FeedbackError> {
        let entry = self.registry.get_visible(identity, agent)?;
        let score = self.trust.update(&identity.tenant_id, entry.name(), signal);
        info!(
            tenant = %identity.tenant_id,
            agent = entry.name(),
            signal = %signal,
            score,
            "Feedback recorded"
        );
        Ok(score)
    }
}
