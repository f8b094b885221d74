//! Authenticated callers
//!
//! A [`Principal`] is what the JWT middleware extracts from a bearer token
//! and what every lifecycle and oversight operation receives as its caller.
//! The administrator has a role but no identity, so it is a separate
//! variant rather than a user with a special role.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Role class used by the authorization table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Engineer,
    Supervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Engineer => "engineer",
            Role::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Engineer => Role::Engineer,
            UserRole::Supervisor => Role::Supervisor,
        }
    }
}

/// The caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    /// Configured administrator; has no user id
    Admin,

    /// Stored engineer or supervisor
    User { id: Uuid, role: UserRole },
}

impl Principal {
    pub fn engineer(id: Uuid) -> Self {
        Principal::User {
            id,
            role: UserRole::Engineer,
        }
    }

    pub fn supervisor(id: Uuid) -> Self {
        Principal::User {
            id,
            role: UserRole::Supervisor,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Admin => Role::Admin,
            Principal::User { role, .. } => (*role).into(),
        }
    }

    /// The user id, or `None` for the administrator
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Principal::Admin => None,
            Principal::User { id, .. } => Some(*id),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Admin => f.write_str("admin"),
            Principal::User { id, role } => write!(f, "{}:{}", role, id),
        }
    }
}
