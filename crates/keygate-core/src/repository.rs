//! Repository trait for permission storage.
//!
//! Every operation is a single atomic call against the store. Missing
//! usernames surface as [`KeygateError::NotFound`]; store failures as
//! [`KeygateError::Database`].
//!
//! [`KeygateError::NotFound`]: crate::error::KeygateError::NotFound
//! [`KeygateError::Database`]: crate::error::KeygateError::Database

use crate::error::KeygateResult;
use crate::models::patch::PermissionPatch;
use crate::models::permission::Permission;

pub trait PermissionRepository: Send + Sync {
    /// Persist a new permission. Fails with `AlreadyExists` when the
    /// username is taken.
    fn create(
        &self,
        permission: Permission,
    ) -> impl Future<Output = KeygateResult<Permission>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = KeygateResult<Permission>> + Send;
    /// Apply every field of `patch` in one update, or none of them.
    fn patch(
        &self,
        username: &str,
        patch: PermissionPatch,
    ) -> impl Future<Output = KeygateResult<()>> + Send;
    /// Replace the stored password hash.
    fn set_password_hash(
        &self,
        username: &str,
        password_hash: String,
    ) -> impl Future<Output = KeygateResult<()>> + Send;
    fn delete(&self, username: &str) -> impl Future<Output = KeygateResult<()>> + Send;
}
