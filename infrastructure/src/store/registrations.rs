//! Persisted remote registrations
//!
//! Remote agents survive a restart through a small JSON file. The file holds
//! registrations only, never API keys; on startup every entry goes through
//! the registry's address checks again.

use roundtable_application::StoreError;
use roundtable_domain::RemoteRegistration;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistrationDocument {
    #[serde(default)]
    agents: Vec<RemoteRegistration>,
}

pub struct RegistrationFile {
    path: PathBuf,
}

impl RegistrationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all registrations. A missing file is an empty list.
    pub async fn load(&self) -> Result<Vec<RemoteRegistration>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let doc: RegistrationDocument = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), count = doc.agents.len(), "Registrations loaded");
        Ok(doc.agents)
    }

    /// Replace the file contents with `agents`.
    pub async fn save(&self, agents: &[RemoteRegistration]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let doc = RegistrationDocument {
            agents: agents.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), count = agents.len(), "Registrations saved");
        Ok(())
    }
}
