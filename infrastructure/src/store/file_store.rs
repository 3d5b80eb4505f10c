//! JSON file artifact store
//!
//! Layout: `<root>/<hex(tenant)>/<hex(task_id)>.json`. Both path segments
//! are hex-encoded, so no identifier can escape its tenant directory.
//! Artifacts are written to a temporary file and hard-linked into place,
//! which fails if the target already exists.

use async_trait::async_trait;
use roundtable_application::{ArtifactStore, StoreError};
use roundtable_domain::{Artifact, ArtifactSummary, TaskId, TenantId, rank_artifacts};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct FileArtifactStore {
    root: PathBuf,
}

impl FileArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tenant_dir(&self, tenant: &TenantId) -> PathBuf {
        self.root.join(hex::encode(tenant.as_str()))
    }

    fn artifact_path(&self, tenant: &TenantId, task_id: &TaskId) -> PathBuf {
        self.tenant_dir(tenant)
            .join(format!("{}.json", hex::encode(task_id.as_str())))
    }

    async fn read_artifact(path: &Path) -> Result<Artifact, StoreError> {
        let bytes = fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug)]
enum LinkError {
    Exists,
    Io(std::io::Error),
}

/// Stage `bytes` in `dir` and hard-link them to `target`. The staging file
/// is removed whether or not the link succeeds.
async fn publish(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), LinkError> {
    let staging = dir.join(format!(".{}.tmp", Uuid::new_v4()));
    let linked = stage_and_link(&staging, target, bytes).await;
    if let Err(e) = fs::remove_file(&staging).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %staging.display(), error = %e, "Could not remove staging file");
    }
    linked
}

async fn stage_and_link(staging: &Path, target: &Path, bytes: &[u8]) -> Result<(), LinkError> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(staging)
        .await
        .map_err(LinkError::Io)?;
    file.write_all(bytes).await.map_err(LinkError::Io)?;
    file.sync_all().await.map_err(LinkError::Io)?;
    drop(file);

    fs::hard_link(staging, target).await.map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            LinkError::Exists
        } else {
            LinkError::Io(e)
        }
    })
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn save(&self, artifact: &Artifact) -> Result<(), StoreError> {
        let dir = self.tenant_dir(&artifact.tenant_id);
        fs::create_dir_all(&dir).await?;

        let target = self.artifact_path(&artifact.tenant_id, &artifact.task_id);
        let already_exists = || StoreError::AlreadyExists {
            tenant_id: artifact.tenant_id.clone(),
            task_id: artifact.task_id.clone(),
        };
        if fs::try_exists(&target).await? {
            return Err(already_exists());
        }

        let bytes = serde_json::to_vec_pretty(artifact)?;
        match publish(&dir, &target, &bytes).await {
            Ok(()) => {
                debug!(
                    tenant = %artifact.tenant_id,
                    task_id = %artifact.task_id,
                    path = %target.display(),
                    "Artifact saved"
                );
                Ok(())
            }
            Err(LinkError::Exists) => Err(already_exists()),
            Err(LinkError::Io(e)) => Err(e.into()),
        }
    }

    async fn get(&self, tenant: &TenantId, task_id: &TaskId) -> Result<Option<Artifact>, StoreError> {
        let path = self.artifact_path(tenant, task_id);
        match Self::read_artifact(&path).await {
            Ok(artifact) => Ok(Some(artifact)),
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn search(
        &self,
        tenant: &TenantId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ArtifactSummary>, StoreError> {
        let dir = self.tenant_dir(tenant);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut artifacts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read_artifact(&path).await {
                // Directory name is the tenant key, the document must agree
                Ok(artifact) if &artifact.tenant_id == tenant => artifacts.push(artifact),
                Ok(_) => warn!(path = %path.display(), "Artifact tenant does not match its directory"),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable artifact"),
            }
        }
        Ok(rank_artifacts(&artifacts, query, limit))
    }
}
