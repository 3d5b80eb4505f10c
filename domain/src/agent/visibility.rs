//! Visibility rules for registered agents.
//!
//! This is the single place that decides whether a requester may see or
//! dispatch to an agent. Listing, eligibility and chat selection all call
//! [`is_visible`].

use super::descriptor::AgentOwner;
use crate::core::identity::IdentityContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who can see and dispatch to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Every tenant
    #[default]
    Public,
    /// Requesters in the owner's tenant
    Team,
    /// Only the owning user
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &str {
        match self {
            Visibility::Public => "public",
            Visibility::Team => "team",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "team" | "tenant" => Ok(Visibility::Team),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

/// Whether `requester` may see an agent with the given visibility and owner.
///
/// User ids are tenant-scoped, so private visibility compares both.
pub fn is_visible(visibility: Visibility, owner: &AgentOwner, requester: &IdentityContext) -> bool {
    match visibility {
        Visibility::Public => true,
        Visibility::Team => owner.tenant_id == requester.tenant_id,
        Visibility::Private => {
            owner.tenant_id == requester.tenant_id && owner.user_id == requester.user_id
        }
    }
}
