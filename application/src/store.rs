//! In-memory artifact store
//!
//! Artifacts are partitioned by tenant first, so a lookup can only ever
//! reach the caller's own partition.

use crate::ports::artifact_store::{ArtifactStore, StoreError};
use async_trait::async_trait;
use roundtable_domain::{Artifact, ArtifactSummary, TaskId, TenantId, rank_artifacts};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryArtifactStore {
    tenants: RwLock<HashMap<TenantId, HashMap<TaskId, Artifact>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, tenant: &TenantId) -> usize {
        self.tenants
            .read()
            .map(|t| t.get(tenant).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, tenant: &TenantId) -> bool {
        self.len(tenant) == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("artifact store lock poisoned".into())
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn save(&self, artifact: &Artifact) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().map_err(|_| poisoned())?;
        let partition = tenants.entry(artifact.tenant_id.clone()).or_default();
        if partition.contains_key(&artifact.task_id) {
            return Err(StoreError::AlreadyExists {
                tenant_id: artifact.tenant_id.clone(),
                task_id: artifact.task_id.clone(),
            });
        }
        partition.insert(artifact.task_id.clone(), artifact.clone());
        Ok(())
    }

    async fn get(&self, tenant: &TenantId, task_id: &TaskId) -> Result<Option<Artifact>, StoreError> {
        let tenants = self.tenants.read().map_err(|_| poisoned())?;
        Ok(tenants.get(tenant).and_then(|p| p.get(task_id)).cloned())
    }

    async fn search(
        &self,
        tenant: &TenantId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ArtifactSummary>, StoreError> {
        let tenants = self.tenants.read().map_err(|_| poisoned())?;
        Ok(match tenants.get(tenant) {
            Some(partition) => rank_artifacts(partition.values(), query, limit),
            None => Vec::new(),
        })
    }
}
