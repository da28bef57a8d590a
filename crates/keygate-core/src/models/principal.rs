//! The resolved acting credential of a request.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::category::{Acl, Op};
use super::permission::Permission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// Root account that owns its own grants.
    Owner,
    /// Credential derived from a stored [`Permission`].
    Delegated,
}

/// Who is acting, and with which capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Owning identity. For an owner this is its own id; for a delegated
    /// credential it is the creator's id.
    pub user_id: String,
    pub username: String,
    pub ops: BTreeSet<Op>,
    pub acls: BTreeSet<Acl>,
    pub is_admin: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub kind: PrincipalKind,
}

impl Principal {
    pub fn has_op(&self, op: Op) -> bool {
        self.ops.contains(&op)
    }

    pub fn has_acl(&self, acl: Acl) -> bool {
        self.acls.contains(&acl)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether this principal's tenant owns `permission`.
    pub fn owns(&self, permission: &Permission) -> bool {
        self.user_id == permission.user_id
    }
}

impl From<&Permission> for Principal {
    fn from(permission: &Permission) -> Self {
        Self {
            user_id: permission.user_id.clone(),
            username: permission.username.clone(),
            ops: permission.ops.clone(),
            acls: permission.acls.clone(),
            is_admin: permission.is_admin,
            expires_at: permission.expires_at(),
            kind: PrincipalKind::Delegated,
        }
    }
}
