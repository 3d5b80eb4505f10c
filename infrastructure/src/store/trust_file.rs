//! Persisted trust scores
//!
//! One JSON document holding every (tenant, agent) record, so feedback
//! given in one process shapes vote weights in the next.

use roundtable_application::{StoreError, TrustTracker};
use roundtable_domain::{TenantId, TrustRecord};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct TrustEntry {
    tenant_id: TenantId,
    agent: String,
    #[serde(flatten)]
    record: TrustRecord,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TrustDocument {
    #[serde(default)]
    scores: Vec<TrustEntry>,
}

pub struct TrustFile {
    path: PathBuf,
}

impl TrustFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Import stored records into `tracker`. A missing file loads nothing.
    pub async fn load_into(&self, tracker: &TrustTracker) -> Result<usize, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let doc: TrustDocument = serde_json::from_slice(&bytes)?;
        let count = doc.scores.len();
        tracker.import(
            doc.scores
                .into_iter()
                .map(|e| (e.tenant_id, e.agent, e.record)),
        );
        debug!(path = %self.path.display(), count, "Trust scores loaded");
        Ok(count)
    }

    /// Write every record `tracker` holds.
    pub async fn save_from(&self, tracker: &TrustTracker) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let doc = TrustDocument {
            scores: tracker
                .export()
                .into_iter()
                .map(|(tenant_id, agent, record)| TrustEntry {
                    tenant_id,
                    agent,
                    record,
                })
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), count = doc.scores.len(), "Trust scores saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::FeedbackSignal;

    #[tokio::test]
    async fn test_scores_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrustFile::new(dir.path().join("trust.json"));
        let acme = TenantId::new("acme");

        let tracker = TrustTracker::default();
        tracker.update(&acme, "skeptic", FeedbackSignal::Reject);
        tracker.update(&acme, "skeptic", FeedbackSignal::Modify);
        file.save_from(&tracker).await.unwrap();

        let restored = TrustTracker::default();
        assert_eq!(file.load_into(&restored).await.unwrap(), 1);
        assert_eq!(restored.record(&acme, "skeptic"), tracker.record(&acme, "skeptic"));
        assert_eq!(restored.score(&TenantId::new("globex"), "skeptic"), 0.5);
    }

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrustFile::new(dir.path().join("trust.json"));
        assert_eq!(file.load_into(&TrustTracker::default()).await.unwrap(), 0);
    }
}
