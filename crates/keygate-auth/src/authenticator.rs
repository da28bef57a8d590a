//! Resolves transport credentials into a [`Principal`].

use keygate_core::credential::{generate_password, hash_password, verify_password};
use keygate_core::error::{KeygateError, KeygateResult};
use keygate_core::models::principal::{Principal, PrincipalKind};
use keygate_core::repository::PermissionRepository;
use tracing::debug;

use crate::config::{AuthConfig, OwnerAccount};
use crate::context::BasicCredentials;
use crate::error::AuthError;

pub trait Authenticator: Send + Sync {
    /// Resolve `credentials`, failing with `Unauthenticated` when they do
    /// not match any account.
    fn authenticate(
        &self,
        credentials: &BasicCredentials,
    ) -> impl Future<Output = KeygateResult<Principal>> + Send;
}

/// Checks configured owner accounts first, then stored permissions.
pub struct StoreAuthenticator<R: PermissionRepository> {
    repo: R,
    owners: Vec<OwnerAccount>,
    pepper: Option<String>,
    /// Hash of a random secret, verified against when the username is
    /// unknown so both failure paths cost one Argon2id verification.
    dummy_hash: Option<String>,
}

impl<R: PermissionRepository> StoreAuthenticator<R> {
    pub fn new(repo: R, config: &AuthConfig) -> Self {
        Self {
            repo,
            owners: config.owners.clone(),
            pepper: config.pepper.clone(),
            dummy_hash: hash_password(&generate_password(), config.pepper.as_deref()).ok(),
        }
    }

    fn verify(&self, password: &str, hash: &str) -> KeygateResult<()> {
        if verify_password(password, hash, self.pepper.as_deref())? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

impl<R: PermissionRepository> Authenticator for StoreAuthenticator<R> {
    async fn authenticate(&self, credentials: &BasicCredentials) -> KeygateResult<Principal> {
        if let Some(owner) = self
            .owners
            .iter()
            .find(|o| o.user_id == credentials.username)
        {
            self.verify(&credentials.password, &owner.password_hash)?;
            return Ok(Principal {
                user_id: owner.user_id.clone(),
                username: owner.user_id.clone(),
                ops: owner.ops.clone(),
                acls: owner.acls.clone(),
                is_admin: owner.is_admin,
                expires_at: None,
                kind: PrincipalKind::Owner,
            });
        }

        let permission = match self.repo.get_by_username(&credentials.username).await {
            Ok(p) => p,
            Err(KeygateError::NotFound { .. }) => {
                debug!(username = %credentials.username, "unknown credential");
                if let Some(hash) = &self.dummy_hash {
                    self.verify(&credentials.password, hash)?;
                }
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };
        self.verify(&credentials.password, &permission.password_hash)?;

        Ok(Principal::from(&permission))
    }
}
