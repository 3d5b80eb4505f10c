//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat;
pub mod record_feedback;
pub mod run_round_table;
