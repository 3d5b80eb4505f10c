//! Artifact store port
//!
//! Append-only, tenant-partitioned storage for finalized artifacts. A
//! tenant can never read or find another tenant's artifacts.

use async_trait::async_trait;
use roundtable_domain::{Artifact, ArtifactSummary, TaskId, TenantId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Artifact {task_id} already exists for tenant {tenant_id}")]
    AlreadyExists { tenant_id: TenantId, task_id: TaskId },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist a new artifact. Existing artifacts are never overwritten.
    async fn save(&self, artifact: &Artifact) -> Result<(), StoreError>;

    async fn get(&self, tenant: &TenantId, task_id: &TaskId) -> Result<Option<Artifact>, StoreError>;

    /// Free-text search within one tenant, best matches first.
    async fn search(
        &self,
        tenant: &TenantId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ArtifactSummary>, StoreError>;
}
