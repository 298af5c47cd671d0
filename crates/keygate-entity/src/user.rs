//! User entity model.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique login name.
    pub username: String,
    /// One-way credential hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Roles assigned to this user, copied by value at assignment time.
    pub roles: Vec<Role>,
}

impl User {
    /// Creates a new user with no role assignments.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            roles: Vec::new(),
        }
    }

    /// Whether the user has an assignment with the given role name.
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|r| r.name == role_name)
    }
}
