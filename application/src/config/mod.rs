//! Application-level configuration.
//!
//! - [`EngineParams`]: round table dispatch control (quorum, timeouts, concurrency)
//! - [`ChatParams`]: chat selection and escalation thresholds

pub mod chat_params;
pub mod engine_params;

pub use chat_params::ChatParams;
pub use engine_params::EngineParams;
