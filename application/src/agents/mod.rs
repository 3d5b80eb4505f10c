//! In-process agents backed by an [`LlmGateway`](crate::ports::llm_gateway::LlmGateway)
//!
//! A [`PromptedAgent`] turns a role description into the three round table
//! capabilities. The [`core`] roles join every round table by default.

pub mod core;
pub mod prompt;
pub mod prompted;
pub mod response_parser;

pub use core::{CoreRole, core_agents};
pub use prompt::{AgentRole, RoundTablePromptTemplate};
pub use prompted::PromptedAgent;
pub use response_parser::extract_json;
