//! Request-scoped state threaded through the guard pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use keygate_core::models::category::{Acl, Op};
use keygate_core::models::principal::Principal;
use uuid::Uuid;

/// The permission endpoints and what each one requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    GetPermission,
    CreatePermission,
    PatchPermission,
    DeletePermission,
    RotatePassword,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::GetPermission => "Get Permission",
            Endpoint::CreatePermission => "Create Permission",
            Endpoint::PatchPermission => "Patch Permission",
            Endpoint::DeletePermission => "Delete Permission",
            Endpoint::RotatePassword => "Rotate Permission Password",
        }
    }

    pub fn required_op(&self) -> Op {
        match self {
            Endpoint::GetPermission => Op::Read,
            Endpoint::CreatePermission | Endpoint::PatchPermission | Endpoint::RotatePassword => {
                Op::Write
            }
            Endpoint::DeletePermission => Op::Delete,
        }
    }

    pub fn required_acl(&self) -> Acl {
        Acl::Permission
    }

    /// Whether the endpoint mutates grants and therefore needs an admin.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Endpoint::GetPermission)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata stamped by the classifier for later stages and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestClass {
    pub request_id: Uuid,
    pub endpoint: Endpoint,
    pub op: Op,
    pub acl: Acl,
}

/// A decoded basic-auth pair.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the guards may inspect about one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub endpoint: Endpoint,
    pub received_at: DateTime<Utc>,
    /// Set by the classifier.
    pub class: Option<RequestClass>,
    /// Resolved acting credential, attached by the authenticator.
    pub principal: Option<Principal>,
}

impl RequestContext {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            received_at: Utc::now(),
            class: None,
            principal: None,
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.class.as_ref().map(|c| c.request_id)
    }
}
