//! Bounds applied to agent output

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceLimits {
    /// Serialized payload size, in bytes
    pub max_payload_bytes: usize,
    pub max_findings: usize,
    pub max_claim_chars: usize,
    /// Limit for rationales and vote reasons
    pub max_text_chars: usize,
    /// Shortest acceptable evidence quote
    pub min_quote_chars: usize,
    pub max_challenges: usize,
}

impl Default for EvidenceLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: 64 * 1024,
            max_findings: 20,
            max_claim_chars: 1_000,
            max_text_chars: 2_000,
            min_quote_chars: 8,
            max_challenges: 40,
        }
    }
}
