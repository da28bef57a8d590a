//! Permission service: fetch, create, patch, delete and password
//! rotation, run after the pipeline has admitted the request.

use keygate_core::credential;
use keygate_core::error::{KeygateError, KeygateResult};
use keygate_core::models::patch::PatchBuilder;
use keygate_core::models::permission::{NewPermission, Permission, PermissionBuilder};
use keygate_core::models::principal::Principal;
use keygate_core::repository::PermissionRepository;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AuthConfig;

/// Result of a password rotation. The plaintext is only returned here.
#[derive(Debug, Clone)]
pub struct RotatedPassword {
    pub username: String,
    pub password: String,
}

/// Permission use-cases.
///
/// Generic over the repository so that the service has no dependency on
/// the database crate. Every operation takes the acting principal
/// explicitly and only ever sees permissions of the principal's own
/// tenant; foreign records are reported as not found.
pub struct PermissionService<R: PermissionRepository> {
    repo: R,
    patch_builder: PatchBuilder,
    pepper: Option<String>,
}

impl<R: PermissionRepository> PermissionService<R> {
    pub fn new(repo: R, config: &AuthConfig) -> Self {
        Self {
            repo,
            patch_builder: PatchBuilder::new(config.immutable_fields),
            pepper: config.pepper.clone(),
        }
    }

    /// Load a permission of the caller's tenant.
    ///
    /// Always reads from the store, even when the caller is itself the
    /// requested credential, so the response reflects the latest patch.
    pub async fn fetch(&self, principal: &Principal, username: &str) -> KeygateResult<Permission> {
        let permission = self.repo.get_by_username(username).await?;
        if !principal.owns(&permission) {
            warn!(
                caller = %principal.username,
                username = %username,
                "cross-tenant permission lookup"
            );
            return Err(KeygateError::permission_not_found(username));
        }
        Ok(permission)
    }

    /// Build and persist a new permission owned by `principal`.
    pub async fn create(&self, principal: &Principal, body: &Value) -> KeygateResult<NewPermission> {
        let created = PermissionBuilder::from_body(principal.user_id.as_str(), body)?
            .build(self.pepper.as_deref())?;

        let stored = self.repo.create(created.permission).await?;
        info!(
            user_id = %stored.user_id,
            username = %stored.username,
            "permission created"
        );

        Ok(NewPermission {
            permission: stored,
            password: created.password,
        })
    }

    /// Apply the explicitly provided fields of `body`.
    ///
    /// The patch is fully validated before the store is touched.
    pub async fn patch(
        &self,
        principal: &Principal,
        username: &str,
        body: &Value,
    ) -> KeygateResult<()> {
        let patch = self.patch_builder.build(body)?;
        self.fetch(principal, username).await?;

        let fields: Vec<String> = patch.field_map().into_keys().collect();
        self.repo.patch(username, patch).await?;
        info!(username = %username, fields = ?fields, "permission patched");
        Ok(())
    }

    pub async fn delete(&self, principal: &Principal, username: &str) -> KeygateResult<()> {
        self.fetch(principal, username).await?;
        self.repo.delete(username).await?;
        info!(username = %username, "permission deleted");
        Ok(())
    }

    /// Replace the password of a derived credential.
    pub async fn rotate_password(
        &self,
        principal: &Principal,
        username: &str,
    ) -> KeygateResult<RotatedPassword> {
        self.fetch(principal, username).await?;

        let password = credential::generate_password();
        let hash = credential::hash_password(&password, self.pepper.as_deref())?;
        self.repo.set_password_hash(username, hash).await?;
        info!(username = %username, "permission password rotated");

        Ok(RotatedPassword {
            username: username.to_string(),
            password,
        })
    }
}
