//! Authentication and authorization decision service.

use std::sync::Arc;

use tracing::{info, warn};

use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_entity::role::Role;
use keygate_entity::token::TokenDetails;

use crate::directory::DirectoryService;
use crate::password::CredentialHasher;
use crate::token::TokenService;

/// Front door for the token and authorization flows.
///
/// Composes the directory, the configured token strategy, and the
/// credential hasher. Authorization decisions re-read the user and role
/// directories on every call, so a deleted role or user stops granting
/// immediately even while its tokens remain technically valid.
pub struct AuthService {
    /// User and role directory.
    directory: Arc<DirectoryService>,
    /// Selected token strategy.
    tokens: Arc<dyn TokenService>,
    /// Injected credential hasher.
    hasher: Arc<dyn CredentialHasher>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("directory", &self.directory)
            .finish()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        directory: Arc<DirectoryService>,
        tokens: Arc<dyn TokenService>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            directory,
            tokens,
            hasher,
        }
    }

    /// Verifies a credential and issues a token on success.
    ///
    /// Unknown usernames and wrong passwords fail identically so callers
    /// cannot probe which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<TokenDetails> {
        let user = match self.directory.find_user(username) {
            Some(user) => user,
            None => {
                warn!(username, "Authentication failed: unknown user");
                return Err(AppError::authentication("Invalid username or password"));
            }
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(username, "Authentication failed: bad credential");
            return Err(AppError::authentication("Invalid username or password"));
        }

        let details = self.tokens.generate(username).await?;
        info!(username, expires_at = details.expires_at, "Authenticated");
        Ok(details)
    }

    /// Explicitly revokes a token. Idempotent.
    pub async fn logout(&self, token: &str) {
        self.tokens.invalidate(token).await;
    }

    /// Returns the token owner's role assignments that still exist in the
    /// role directory.
    pub async fn get_roles(&self, token: &str) -> AppResult<Vec<Role>> {
        let username = self.tokens.validate(token).await?;
        self.directory.roles_of(&username)
    }

    /// Whether the token's owner holds the named role.
    ///
    /// Role existence is re-checked at decision time: querying a role that
    /// has since been deleted is an error, not a silent `false`.
    pub async fn check_role(&self, token: &str, role_name: &str) -> AppResult<bool> {
        let username = self.tokens.validate(token).await?;

        if !self.directory.role_exists(role_name) {
            return Err(AppError::not_found(format!(
                "Role '{role_name}' does not exist"
            )));
        }

        let user = self.directory.find_user(&username).ok_or_else(|| {
            AppError::not_found(format!("User '{username}' does not exist"))
        })?;

        Ok(user.has_role(role_name))
    }

    /// Whether the token's owner is granted `capability` through any
    /// surviving role, exactly or via the wildcard.
    pub async fn has_capability(&self, token: &str, capability: &str) -> AppResult<bool> {
        let username = self.tokens.validate(token).await?;
        let roles = self.directory.roles_of(&username)?;
        Ok(roles.iter().any(|role| role.grants(capability)))
    }

    /// Gates an operation on `capability`.
    ///
    /// Propagates `Authentication`/`Expired` untouched so the transport
    /// layer can distinguish "not authenticated" from "authenticated but
    /// forbidden"; an insufficient grant is an `Authorization` failure.
    pub async fn authorize(&self, token: &str, capability: &str) -> AppResult<()> {
        if self.has_capability(token, capability).await? {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Missing required capability '{capability}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use keygate_core::ErrorKind;
    use keygate_entity::role::ability;

    use crate::password::PasswordHasher;
    use crate::token::OpaqueTokenService;

    use super::*;

    fn service() -> AuthService {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(PasswordHasher::new());
        let directory = Arc::new(DirectoryService::new(hasher.clone()));
        let tokens = Arc::new(OpaqueTokenService::new(Duration::hours(2)));
        AuthService::new(directory, tokens, hasher)
    }

    #[tokio::test]
    async fn test_unknown_user_and_bad_password_look_identical() {
        let auth = service();
        auth.directory.create_user("alice", "pw").unwrap();

        let unknown = auth.authenticate("ghost", "pw").await.unwrap_err();
        let wrong = auth.authenticate("alice", "nope").await.unwrap_err();

        assert_eq!(unknown.kind, ErrorKind::Authentication);
        assert_eq!(wrong.kind, ErrorKind::Authentication);
        assert_eq!(unknown.message, wrong.message);
    }

    #[tokio::test]
    async fn test_check_role_requires_existing_role() {
        let auth = service();
        auth.directory.create_user("alice", "pw").unwrap();
        let token = auth.authenticate("alice", "pw").await.unwrap().token;

        let err = auth.check_role(&token, "editor").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        auth.directory.create_role("editor", "edit").unwrap();
        assert!(!auth.check_role(&token, "editor").await.unwrap());

        auth.directory.add_role_to_user("alice", "editor").unwrap();
        assert!(auth.check_role(&token, "editor").await.unwrap());
    }

    #[tokio::test]
    async fn test_wildcard_authorizes_everything() {
        let auth = service();
        auth.directory.init_admin("root", "pw").unwrap();
        let token = auth.authenticate("root", "pw").await.unwrap().token;

        auth.authorize(&token, ability::CREATE_USER).await.unwrap();
        auth.authorize(&token, ability::DELETE_ROLE).await.unwrap();
    }

    #[tokio::test]
    async fn test_deleted_user_token_authorizes_nothing() {
        let auth = service();
        auth.directory.init_admin("root", "pw").unwrap();
        auth.directory.create_user("alice", "pw").unwrap();
        let token = auth.authenticate("alice", "pw").await.unwrap().token;

        auth.directory.delete_user("alice").unwrap();

        // Token validation still resolves the name, but every decision
        // path re-reads the user record and fails.
        let err = auth.get_roles(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = auth.authorize(&token, "edit").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_logout_revokes() {
        let auth = service();
        auth.directory.create_user("alice", "pw").unwrap();
        let token = auth.authenticate("alice", "pw").await.unwrap().token;

        auth.logout(&token).await;
        auth.logout(&token).await;

        let err = auth.get_roles(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
