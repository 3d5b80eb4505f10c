//! Infrastructure layer for round-table
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: remote agents over HTTP and webhooks, signed
//! callbacks, DNS resolution, file-backed persistence and configuration
//! file loading.

pub mod agents;
pub mod callback;
pub mod config;
pub mod dns;
pub mod store;

// Re-export commonly used types
pub use agents::{AgentEndpoint, HttpConnector, RemoteHttpAgent, WebhookAgent};
pub use callback::{CallbackDelivery, CallbackError, CallbackHub, PendingCallback};
pub use config::{ConfigError, ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use dns::DnsHostResolver;
pub use store::{FileArtifactStore, RegistrationFile, TrustFile};
