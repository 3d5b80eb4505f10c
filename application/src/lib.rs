//! Application layer for round-table
//!
//! This crate contains use cases, port definitions, the agent registry and
//! the trust tracker. It depends only on the domain layer.

pub mod agents;
pub mod config;
pub mod ports;
pub mod rate_limit;
pub mod registry;
pub mod store;
pub mod trust;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChatParams, EngineParams};
pub use ports::{
    agent::{Agent, AgentError},
    agent_connector::{AgentConnector, ConnectError},
    artifact_store::{ArtifactStore, StoreError},
    host_resolver::{HostResolver, ResolveError, StaticHostResolver},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, ProgressNotifier, TracingProgress},
    strategist::{StrategyDecision, Strategist, TagStrategist},
};
pub use rate_limit::{RateLimitError, RateLimitParams, RateLimiter};
pub use registry::{AgentEntry, AgentRegistry, RegistryError, RegistryOptions};
pub use store::InMemoryArtifactStore;
pub use trust::TrustTracker;
pub use use_cases::chat::{ChatError, ChatOrchestrator};
pub use use_cases::record_feedback::{FeedbackError, RecordFeedbackUseCase};
pub use use_cases::run_round_table::{RoundTableEngine, RoundTableError, TaskHandle};
