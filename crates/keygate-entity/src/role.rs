//! Role entity and the ability tags it can grant.

use serde::{Deserialize, Serialize};

/// Well-known ability tags for the administrative operations, plus the
/// wildcard that grants every capability.
pub mod ability {
    /// Grants every capability.
    pub const ALL: &str = "all";
    /// Create a new user account.
    pub const CREATE_USER: &str = "create_user";
    /// Delete an existing user account.
    pub const DELETE_USER: &str = "delete_user";
    /// Create a new role.
    pub const CREATE_ROLE: &str = "create_role";
    /// Delete an existing role.
    pub const DELETE_ROLE: &str = "delete_role";
    /// Assign a role to a user.
    pub const ADD_ROLE_TO_USER: &str = "add_role_to_user";
    /// Query whether a user holds a specific role.
    pub const CHECK_ROLE: &str = "check_role";
    /// List a user's roles.
    pub const GET_ALL_ROLES: &str = "get_all_roles";
}

/// A named role granting a single ability tag.
///
/// Roles are singletons in the role directory, referenced **by value**:
/// assignment copies the role into the user record, so a later change to
/// the directory definition does not propagate to existing assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role name.
    pub name: String,
    /// The capability tag this role grants, or [`ability::ALL`].
    pub ability: String,
}

impl Role {
    /// Creates a new role.
    pub fn new(name: impl Into<String>, ability: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ability: ability.into(),
        }
    }

    /// Whether this role grants the given capability.
    ///
    /// Matching is exact: a role granting `"read_only"` does not satisfy a
    /// required capability of `"read"`. Only the wildcard grants everything.
    pub fn grants(&self, capability: &str) -> bool {
        self.ability == ability::ALL || self.ability == capability
    }
}
