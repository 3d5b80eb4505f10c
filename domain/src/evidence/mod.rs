//! Evidence enforcement
//!
//! Agents are untrusted. Every finding must quote the task input, every
//! payload must stay within [`EvidenceLimits`], and all agent text is
//! sanitized before it can reach another agent.

pub mod enforcer;
pub mod limits;
pub mod rejection;
pub mod sanitize;

pub use enforcer::{ChallengeReview, DEFAULT_CONFIDENCE, EvidenceEnforcer};
pub use limits::EvidenceLimits;
pub use rejection::RejectionReason;
pub use sanitize::{sanitize_text, strip_invisible};
