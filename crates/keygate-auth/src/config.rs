//! Authentication configuration.

use std::collections::BTreeSet;

use keygate_core::models::category::{Acl, Op};
use keygate_core::models::patch::ImmutableFieldPolicy;

/// A root account that creates and manages derived credentials.
#[derive(Debug, Clone)]
pub struct OwnerAccount {
    /// Identity stamped as `user_id` on every permission it creates.
    pub user_id: String,
    /// Argon2id PHC hash of the account password.
    pub password_hash: String,
    pub ops: BTreeSet<Op>,
    pub acls: BTreeSet<Acl>,
    pub is_admin: bool,
}

impl OwnerAccount {
    /// An admin owner holding every operation and ACL category.
    pub fn admin(user_id: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password_hash: password_hash.into(),
            ops: Op::ALL.into_iter().collect(),
            acls: Acl::ALL.into_iter().collect(),
            is_admin: true,
        }
    }
}

/// Configuration for authentication and the permission service.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Root accounts checked before stored permissions.
    pub owners: Vec<OwnerAccount>,
    /// Handling of immutable keys in patch bodies.
    pub immutable_fields: ImmutableFieldPolicy,
}
