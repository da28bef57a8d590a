//! Sparse updates to a stored permission.
//!
//! A patch only ever carries the fields the client explicitly sent.
//! `"ops": []` sets the empty set; omitting `ops` leaves it untouched.
//! Validation happens before anything reaches the store, so an invalid
//! patch is rejected as a whole.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Value, json};
use tracing::debug;

use super::category::{Acl, Op, parse_acls, parse_ops};
use super::limits::LimitsInput;
use super::permission::string_array;
use crate::error::{KeygateError, KeygateResult};

/// Keys that identify a permission and can never change.
pub const IMMUTABLE_KEYS: [&str; 5] = ["user_id", "username", "password", "created_at", "is_admin"];

/// What to do with immutable keys found in a patch body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImmutableFieldPolicy {
    /// Fail the whole patch with a validation error.
    #[default]
    Reject,
    /// Drop the key and continue.
    Ignore,
}

/// Validated, sparse set of field mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPatch {
    pub ops: Option<BTreeSet<Op>>,
    pub acls: Option<BTreeSet<Acl>>,
    pub limits: Option<LimitsInput>,
}

impl PermissionPatch {
    pub fn is_empty(&self) -> bool {
        self.ops.is_none() && self.acls.is_none() && self.limits.is_none()
    }

    /// Field path → new value, for stores that apply partial updates.
    ///
    /// Limits are flattened to `limits.<key>` so that a patch touching
    /// one limit leaves the others alone.
    pub fn field_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        if let Some(ops) = &self.ops {
            map.insert("ops".to_string(), json!(ops));
        }
        if let Some(acls) = &self.acls {
            map.insert("acls".to_string(), json!(acls));
        }
        if let Some(limits) = &self.limits {
            for (key, value) in limits.rate_entries() {
                if let Some(v) = value {
                    map.insert(format!("limits.{key}"), json!(v));
                }
            }
            if let Some(ttl) = limits.ttl_sec {
                map.insert("limits.ttl_sec".to_string(), json!(ttl));
            }
        }
        map
    }
}

/// Turns a raw JSON body into a [`PermissionPatch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchBuilder {
    policy: ImmutableFieldPolicy,
}

impl PatchBuilder {
    pub fn new(policy: ImmutableFieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ImmutableFieldPolicy {
        self.policy
    }

    pub fn build(&self, body: &Value) -> KeygateResult<PermissionPatch> {
        let Value::Object(fields) = body else {
            return Err(KeygateError::validation("body", "expected a JSON object"));
        };

        let mut patch = PermissionPatch::default();
        for (key, value) in fields {
            let key = key.as_str();
            if IMMUTABLE_KEYS.contains(&key) {
                match self.policy {
                    ImmutableFieldPolicy::Reject => {
                        return Err(KeygateError::validation(key, "field is immutable"));
                    }
                    ImmutableFieldPolicy::Ignore => {
                        debug!(field = key, "ignoring immutable field in patch");
                        continue;
                    }
                }
            }
            if value.is_null() {
                return Err(KeygateError::validation(key, "may not be null"));
            }
            match key {
                "ops" => patch.ops = Some(parse_ops("ops", string_array("ops", value)?)?),
                "acls" => patch.acls = Some(parse_acls("acls", string_array("acls", value)?)?),
                "limits" => {
                    let limits = LimitsInput::from_json(value)?;
                    if limits.is_empty() {
                        return Err(KeygateError::validation("limits", "no limit keys provided"));
                    }
                    patch.limits = Some(limits);
                }
                other => {
                    return Err(KeygateError::validation(other, "unknown field"));
                }
            }
        }

        if patch.is_empty() {
            return Err(KeygateError::validation(
                "body",
                "no patchable fields provided",
            ));
        }
        Ok(patch)
    }
}
