//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use roundtable_domain::{FeedbackSignal, InvocationMode, Role, Visibility};
use std::path::PathBuf;

/// Output format for round table results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Findings, votes and the decision
    Full,
    /// Only the recommendation and the decision
    Summary,
    /// The stored artifact as JSON
    Json,
}

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Round Table - independent agents deliberate and vote")]
#[command(long_about = r#"
Round Table sends a task to several independent agents and keeps only what
they can back with quotes from the input.

A task moves through these phases:
1. Analyzing:   every agent reports findings citing the input
2. Challenging: agents object to or concede each other's findings
3. Synthesizing: findings are merged, majority claims become key findings
4. Voting:      agents approve or dissent, weighted by tenant trust

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_* environment variables (e.g. ROUNDTABLE_ENGINE__QUORUM=3)
2. --config <path>     Explicit config file
3. ./roundtable.toml   Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable register legal --domain "contract law" --url https://legal.example.com
  roundtable run --tag vendor "$(cat questionnaire.txt)"
  roundtable feedback legal accept
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

/// The identity requests run under
#[derive(Args, Debug, Clone)]
pub struct IdentityArgs {
    #[arg(long, default_value = "default", global = true)]
    pub tenant: String,

    #[arg(long, default_value = "operator", global = true)]
    pub user: String,

    /// admin, member or viewer
    #[arg(long, default_value = "member", global = true)]
    pub role: Role,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List agents visible to this identity
    Agents {
        /// Probe every agent's health first
        #[arg(long)]
        probe: bool,
    },

    /// Register a remote agent
    Register {
        /// Unique agent name
        name: String,

        /// Short description of the agent's expertise
        #[arg(long)]
        domain: String,

        /// Base URL of the agent's endpoint
        #[arg(long)]
        url: String,

        /// public, team or private
        #[arg(long, default_value = "team")]
        visibility: Visibility,

        /// sync or webhook
        #[arg(long, default_value = "sync")]
        mode: InvocationMode,

        /// Capability tag (can be specified multiple times)
        #[arg(long = "capability", value_name = "TAG")]
        capabilities: Vec<String>,
    },

    /// Remove a remote agent you own
    Unregister { name: String },

    /// Run a round table on a task
    Run {
        /// Task text; agents must quote it as evidence
        query: String,

        /// Domain tag used to pick agents (can be specified multiple times)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Skip the strategizing phase
        #[arg(long)]
        simple: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,
    },

    /// Ask a quick question; suggests a round table when agents disagree
    Ask {
        query: String,

        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Search stored artifacts
    Search {
        query: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show one stored artifact
    Show {
        task_id: String,

        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,
    },

    /// Record feedback on an agent's contribution
    Feedback {
        agent: String,

        /// accept, reject, modify or dismiss
        signal: FeedbackSignal,
    },

    /// Show configuration sources, effective values and issues
    Config,
}
