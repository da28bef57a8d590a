//! Permission domain model and construction builder.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::category::{Acl, Op, parse_acls, parse_ops};
use super::limits::{Limits, LimitsInput};
use crate::credential;
use crate::error::{KeygateError, KeygateResult};

/// A grant of a bounded capability set to a derived credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Identifier of the creator that owns this grant.
    pub user_id: String,
    pub username: String,
    /// Argon2id PHC hash. Never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub ops: BTreeSet<Op>,
    pub acls: BTreeSet<Acl>,
    pub limits: Limits,
    /// Derived credentials are never admins.
    #[serde(default)]
    pub is_admin: bool,
}

impl Permission {
    /// `created_at + ttl_sec`. A lifetime past chrono's range saturates
    /// to the latest representable instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.limits.ttl_sec.map(|ttl| {
            TimeDelta::try_seconds(ttl)
                .and_then(|ttl| self.created_at.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Fields applied when the creation request omits them.
#[derive(Debug, Clone)]
pub struct PermissionDefaults {
    pub ops: BTreeSet<Op>,
    pub acls: BTreeSet<Acl>,
    pub limits: Limits,
}

/// Default grant: read-only search, get and count.
pub fn defaults() -> PermissionDefaults {
    PermissionDefaults {
        ops: BTreeSet::from([Op::Read]),
        acls: BTreeSet::from([Acl::Search, Acl::Get, Acl::Count]),
        limits: Limits::default(),
    }
}

/// A freshly built permission together with its plaintext password.
///
/// The plaintext is only available here, at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct NewPermission {
    #[serde(flatten)]
    pub permission: Permission,
    pub password: String,
}

/// Keys a client may supply on creation.
const CREATE_KEYS: [&str; 4] = ["user_id", "ops", "acls", "limits"];

/// Keys that exist on a permission but are never client-settable.
pub const SERVER_ASSIGNED_KEYS: [&str; 4] = ["username", "password", "created_at", "is_admin"];

/// Builder for a new [`Permission`].
///
/// Setters may be applied in any order; each validates its own argument
/// and fails on the first invalid value. Omitted fields fall back to
/// [`defaults()`] in [`PermissionBuilder::build`].
#[derive(Debug, Clone)]
pub struct PermissionBuilder {
    creator_id: String,
    ops: Option<BTreeSet<Op>>,
    acls: Option<BTreeSet<Acl>>,
    limits: Option<LimitsInput>,
}

impl PermissionBuilder {
    pub fn new(creator_id: impl Into<String>) -> Self {
        Self {
            creator_id: creator_id.into(),
            ops: None,
            acls: None,
            limits: None,
        }
    }

    /// Confirm the owning user id. Only the creator's own id is accepted.
    pub fn user_id(self, user_id: &str) -> KeygateResult<Self> {
        if user_id != self.creator_id {
            return Err(KeygateError::validation(
                "user_id",
                "must match the authenticated creator",
            ));
        }
        Ok(self)
    }

    pub fn ops<I, S>(mut self, ops: I) -> KeygateResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ops = Some(parse_ops("ops", ops)?);
        Ok(self)
    }

    pub fn acls<I, S>(mut self, acls: I) -> KeygateResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.acls = Some(parse_acls("acls", acls)?);
        Ok(self)
    }

    pub fn limits(mut self, limits: &Value) -> KeygateResult<Self> {
        self.limits = Some(LimitsInput::from_json(limits)?);
        Ok(self)
    }

    /// Apply every key present in a JSON creation body.
    pub fn from_body(creator_id: impl Into<String>, body: &Value) -> KeygateResult<Self> {
        let Value::Object(fields) = body else {
            return Err(KeygateError::validation("body", "expected a JSON object"));
        };

        let mut builder = Self::new(creator_id);
        for (key, value) in fields {
            if value.is_null() {
                return Err(KeygateError::validation(key.as_str(), "may not be null"));
            }
            builder = match key.as_str() {
                "user_id" => {
                    let id = value.as_str().ok_or_else(|| {
                        KeygateError::validation("user_id", "expected a string")
                    })?;
                    builder.user_id(id)?
                }
                "ops" => builder.ops(string_array("ops", value)?)?,
                "acls" => builder.acls(string_array("acls", value)?)?,
                "limits" => builder.limits(value)?,
                k if SERVER_ASSIGNED_KEYS.contains(&k) => {
                    return Err(KeygateError::validation(k, "is assigned by the server"));
                }
                k => {
                    return Err(KeygateError::validation(
                        k,
                        format!("unknown field, expected one of {CREATE_KEYS:?}"),
                    ));
                }
            };
        }
        Ok(builder)
    }

    /// Merge supplied fields over defaults and generate credentials.
    pub fn build(self, pepper: Option<&str>) -> KeygateResult<NewPermission> {
        let PermissionDefaults {
            ops,
            acls,
            mut limits,
        } = defaults();
        if let Some(input) = &self.limits {
            input.apply_to(&mut limits);
        }

        let password = credential::generate_password();
        let password_hash = credential::hash_password(&password, pepper)?;

        let permission = Permission {
            user_id: self.creator_id,
            username: credential::generate_username(),
            password_hash,
            created_at: Utc::now(),
            ops: self.ops.unwrap_or(ops),
            acls: self.acls.unwrap_or(acls),
            limits,
            is_admin: false,
        };

        Ok(NewPermission {
            permission,
            password,
        })
    }
}

/// Read a JSON array of strings, reporting shape errors on `field`.
pub(crate) fn string_array<'a>(field: &str, value: &'a Value) -> KeygateResult<Vec<&'a str>> {
    let items = value
        .as_array()
        .ok_or_else(|| KeygateError::validation(field, "expected an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| KeygateError::validation(field, "expected an array of strings"))
        })
        .collect()
}
