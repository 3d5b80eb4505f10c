//! Identity value objects
//!
//! Every operation runs under an [`IdentityContext`] supplied by the boundary
//! layer. Authentication itself happens upstream; the domain only consumes
//! the resulting tenant, user and role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Defines a string-backed identifier newtype with the usual conversions.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

pub(crate) use string_id;

string_id! {
    /// Tenant identifier. All persisted data is partitioned by tenant.
    TenantId
}

string_id! {
    /// User identifier, unique within a tenant.
    UserId
}

impl TenantId {
    /// Tenant that owns process-local core agents.
    pub fn system() -> Self {
        Self::new("system")
    }
}

/// Role of the caller within its tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role may register or remove agents.
    pub fn can_manage_agents(&self) -> bool {
        matches!(self, Role::Admin | Role::Member)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The identity under which a request runs
///
/// # Example
///
/// ```
/// use roundtable_domain::core::identity::{IdentityContext, Role};
///
/// let ctx = IdentityContext::new("acme", "alice", Role::Member);
/// assert_eq!(ctx.tenant_id.as_str(), "acme");
/// assert!(ctx.role.can_manage_agents());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub role: Role,
}

impl IdentityContext {
    pub fn new(tenant_id: impl Into<TenantId>, user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            role,
        }
    }

    /// Identity used for process-local bookkeeping (core agent registration).
    pub fn system() -> Self {
        Self::new(TenantId::system(), "system", Role::Admin)
    }

    pub fn is_same_tenant(&self, tenant: &TenantId) -> bool {
        &self.tenant_id == tenant
    }
}

impl fmt::Display for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.tenant_id, self.user_id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("viewer".parse::<Role>().unwrap(), Role::Viewer);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_viewer_cannot_manage_agents() {
        assert!(!Role::Viewer.can_manage_agents());
        assert!(Role::Admin.can_manage_agents());
    }

    #[test]
    fn test_identity_display() {
        let ctx = IdentityContext::new("acme", "bob", Role::Viewer);
        assert_eq!(ctx.to_string(), "acme/bob (viewer)");
    }

    #[test]
    fn test_tenant_id_serializes_transparently() {
        let json = serde_json::to_string(&TenantId::new("acme")).unwrap();
        assert_eq!(json, "\"acme\"");
    }
}
