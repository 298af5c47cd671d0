//! User and role directory — owns identity records and role definitions.

use std::sync::Arc;

use tracing::info;

use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_entity::role::{Role, ability};
use keygate_entity::user::User;

use crate::password::CredentialHasher;
use crate::store::KeyedStore;

/// Name of the bootstrap administrator role.
pub const ADMIN_ROLE: &str = "admin";

/// CRUD over users and roles.
///
/// Users are unique by name and hold snapshot copies of their assigned
/// roles; deleting a role from the directory does not rewrite existing
/// user records, so read paths filter assignments against the current
/// role directory.
pub struct DirectoryService {
    /// username → user record.
    users: KeyedStore<User>,
    /// role name → role definition.
    roles: KeyedStore<Role>,
    /// Injected credential hasher.
    hasher: Arc<dyn CredentialHasher>,
}

impl std::fmt::Debug for DirectoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryService")
            .field("users", &self.users.len())
            .field("roles", &self.roles.len())
            .finish()
    }
}

impl DirectoryService {
    /// Creates an empty directory using the given hasher.
    pub fn new(hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            users: KeyedStore::new(),
            roles: KeyedStore::new(),
            hasher,
        }
    }

    /// Creates the bootstrap administrator: the admin role with the
    /// wildcard ability, and an account holding it.
    pub fn init_admin(&self, username: &str, password: &str) -> AppResult<()> {
        if self.users.contains(username) {
            return Err(AppError::conflict(format!(
                "User '{username}' already exists"
            )));
        }

        let admin_role = Role::new(ADMIN_ROLE, ability::ALL);
        self.roles.set(ADMIN_ROLE, admin_role.clone());

        let mut admin = User::new(username, self.hasher.hash(password)?);
        admin.roles.push(admin_role);
        self.users.set(username, admin);

        info!(username, "Bootstrap admin created");
        Ok(())
    }

    /// Creates a new user with a hashed credential.
    pub fn create_user(&self, username: &str, password: &str) -> AppResult<()> {
        if self.users.contains(username) {
            return Err(AppError::conflict(format!(
                "User '{username}' already exists"
            )));
        }

        let password_hash = self.hasher.hash(password)?;
        self.users.set(username, User::new(username, password_hash));

        info!(username, "User created");
        Ok(())
    }

    /// Deletes an existing user.
    pub fn delete_user(&self, username: &str) -> AppResult<()> {
        if !self.users.remove(username) {
            return Err(AppError::not_found(format!(
                "User '{username}' does not exist"
            )));
        }
        info!(username, "User deleted");
        Ok(())
    }

    /// Creates a new role granting a single ability tag.
    pub fn create_role(&self, name: &str, role_ability: &str) -> AppResult<()> {
        if self.roles.contains(name) {
            return Err(AppError::conflict(format!("Role '{name}' already exists")));
        }

        self.roles.set(name, Role::new(name, role_ability));

        info!(role = name, ability = role_ability, "Role created");
        Ok(())
    }

    /// Deletes an existing role. Outstanding user assignments survive as
    /// stale copies and are filtered on read.
    pub fn delete_role(&self, name: &str) -> AppResult<()> {
        if !self.roles.remove(name) {
            return Err(AppError::not_found(format!("Role '{name}' does not exist")));
        }
        info!(role = name, "Role deleted");
        Ok(())
    }

    /// Assigns a role to a user by copying the current definition into the
    /// user record. Re-assigning an already-held role is a no-op success.
    pub fn add_role_to_user(&self, username: &str, role_name: &str) -> AppResult<()> {
        let mut user = self.users.get(username).ok_or_else(|| {
            AppError::not_found(format!("User '{username}' does not exist"))
        })?;

        let role = self.roles.get(role_name).ok_or_else(|| {
            AppError::not_found(format!("Role '{role_name}' does not exist"))
        })?;

        if user.has_role(role_name) {
            return Ok(());
        }

        user.roles.push(role);
        self.users.set(username, user);

        info!(username, role = role_name, "Role assigned to user");
        Ok(())
    }

    /// Returns the user's assignments that still exist in the role
    /// directory, dropping copies of since-deleted roles.
    pub fn roles_of(&self, username: &str) -> AppResult<Vec<Role>> {
        let user = self.users.get(username).ok_or_else(|| {
            AppError::not_found(format!("User '{username}' does not exist"))
        })?;

        Ok(user
            .roles
            .into_iter()
            .filter(|role| self.roles.contains(&role.name))
            .collect())
    }

    /// Whether a role currently exists in the directory.
    pub fn role_exists(&self, name: &str) -> bool {
        self.roles.contains(name)
    }

    /// Looks up a user record by name.
    pub fn find_user(&self, username: &str) -> Option<User> {
        self.users.get(username)
    }
}
