//! Configuration file loading for round-table
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ROUNDTABLE_*` environment variables (`__` separates section and key)
//! 2. `--config <path>` specified file
//! 3. Project root: `./roundtable.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/roundtable/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileChatConfig, FileConfig, FileConsensusConfig, FileEngineConfig,
    FileRegistryConfig, FileStoreConfig, FileWebhookConfig, Severity,
};
pub use loader::{ConfigError, ConfigLoader};
