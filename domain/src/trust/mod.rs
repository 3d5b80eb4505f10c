//! Per-tenant agent trust

pub mod score;
pub mod signal;

pub use score::{TrustPolicy, TrustRecord};
pub use signal::FeedbackSignal;
