//! Dependency wiring
//!
//! Builds every adapter from the loaded configuration and restores the
//! persisted registry and trust state.

use anyhow::{Context, Result};
use roundtable_application::{
    AgentRegistry, ArtifactStore, ChatOrchestrator, RecordFeedbackUseCase, RoundTableEngine,
    TagStrategist, TrustTracker,
};
use roundtable_domain::{Artifact, ArtifactSummary, EvidenceEnforcer, TaskId, TenantId};
use roundtable_infrastructure::{
    CallbackHub, ConfigLoader, DnsHostResolver, FileArtifactStore, FileConfig, HttpConnector,
    RegistrationFile, TrustFile,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct App {
    pub config: FileConfig,
    pub registry: Arc<AgentRegistry>,
    pub trust: Arc<TrustTracker>,
    pub store: Arc<FileArtifactStore>,
    registrations: RegistrationFile,
    trust_file: TrustFile,
}

impl App {
    pub async fn build(config: FileConfig) -> Result<Self> {
        let data_dir = ConfigLoader::data_dir();

        let resolver = Arc::new(DnsHostResolver::new(config.registry.dns_timeout()));
        let mut connector = HttpConnector::new(config.registry.request_timeout())?;
        if let Some(url) = &config.webhook.callback_url {
            match config.webhook.secret() {
                Some(secret) => {
                    let hub = CallbackHub::new(secret.into_bytes(), url.clone())?
                        .with_tolerance(config.webhook.tolerance_secs);
                    connector =
                        connector.with_callbacks(Arc::new(hub), config.webhook.callback_ttl());
                }
                None => warn!(
                    env = %config.webhook.secret_env,
                    "webhook.callback_url is set but the signing secret is missing, webhook agents are disabled"
                ),
            }
        }

        let registry = Arc::new(
            AgentRegistry::new(resolver, config.registry_options())
                .with_connector(Arc::new(connector)),
        );

        let registrations = RegistrationFile::new(
            config
                .registry
                .persist_path
                .clone()
                .unwrap_or_else(|| data_dir.join("agents.json")),
        );
        let saved = registrations
            .load()
            .await
            .with_context(|| format!("reading {}", registrations.path().display()))?;
        let restored = saved.len();
        for (name, error) in registry.restore(saved).await {
            warn!(agent = %name, error = %error, "Skipping persisted agent");
        }

        let trust = Arc::new(TrustTracker::new(config.trust));
        let trust_file = TrustFile::new(
            config
                .store
                .trust_path
                .clone()
                .unwrap_or_else(|| data_dir.join("trust.json")),
        );
        trust_file
            .load_into(&trust)
            .await
            .with_context(|| format!("reading {}", trust_file.path().display()))?;

        let artifact_dir: PathBuf = config
            .store
            .artifact_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("artifacts"));
        let store = Arc::new(FileArtifactStore::new(artifact_dir));

        info!(
            agents = registry.count()?,
            restored,
            store = %store.root().display(),
            "Round table ready"
        );

        Ok(Self {
            config,
            registry,
            trust,
            store,
            registrations,
            trust_file,
        })
    }

    pub fn engine(&self) -> RoundTableEngine {
        RoundTableEngine::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.trust),
            self.store.clone(),
            EvidenceEnforcer::new(self.config.evidence),
            self.config.engine_params(),
        )
        .with_strategist(Arc::new(TagStrategist))
    }

    pub fn chat(&self) -> ChatOrchestrator {
        ChatOrchestrator::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.trust),
            EvidenceEnforcer::new(self.config.evidence),
            self.config.chat_params(),
        )
    }

    pub fn feedback(&self) -> RecordFeedbackUseCase {
        RecordFeedbackUseCase::new(Arc::clone(&self.registry), Arc::clone(&self.trust))
    }

    pub async fn search(
        &self,
        tenant: &TenantId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ArtifactSummary>> {
        Ok(self.store.search(tenant, query, limit).await?)
    }

    pub async fn artifact(&self, tenant: &TenantId, task_id: &TaskId) -> Result<Option<Artifact>> {
        Ok(self.store.get(tenant, task_id).await?)
    }

    /// Write the current remote registrations back to disk.
    pub async fn save_registrations(&self) -> Result<()> {
        let remote = self.registry.remote_registrations()?;
        self.registrations.save(&remote).await?;
        Ok(())
    }

    pub async fn save_trust(&self) -> Result<()> {
        self.trust_file.save_from(&self.trust).await?;
        Ok(())
    }
}
