//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use keygate_core::error::KeygateResult;
use keygate_core::models::category::{parse_acls, parse_ops};
use keygate_core::models::limits::Limits;
use keygate_core::models::patch::PermissionPatch;
use keygate_core::models::permission::Permission;
use keygate_core::repository::PermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};

use crate::error::DbError;

const ENTITY: &str = "permission";

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    user_id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    ops: Vec<String>,
    acls: Vec<String>,
    limits: serde_json::Value,
    is_admin: bool,
}

impl PermissionRow {
    fn into_permission(self) -> Result<Permission, DbError> {
        let ops = parse_ops("ops", &self.ops).map_err(|e| DbError::Decode(e.to_string()))?;
        let acls = parse_acls("acls", &self.acls).map_err(|e| DbError::Decode(e.to_string()))?;
        let limits: Limits = serde_json::from_value(self.limits)
            .map_err(|e| DbError::Decode(format!("invalid limits: {e}")))?;

        Ok(Permission {
            user_id: self.user_id,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
            ops,
            acls,
            limits,
            is_admin: self.is_admin,
        })
    }
}

fn not_found(username: &str) -> DbError {
    DbError::NotFound {
        entity: ENTITY.into(),
        id: username.to_string(),
    }
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn exists(&self, username: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $username)")
            .bind(("username", username.to_string()))
            .await?;
        let rows: Vec<PermissionRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, permission: Permission) -> KeygateResult<Permission> {
        let username = permission.username.clone();
        let limits = serde_json::to_value(&permission.limits)
            .map_err(|e| DbError::Decode(format!("invalid limits: {e}")))?;
        let ops: Vec<String> = permission.ops.iter().map(|op| op.to_string()).collect();
        let acls: Vec<String> = permission.acls.iter().map(|acl| acl.to_string()).collect();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $username) SET \
                 user_id = $user_id, username = $username, \
                 password_hash = $password_hash, created_at = $created_at, \
                 ops = $ops, acls = $acls, limits = $limits, \
                 is_admin = $is_admin",
            )
            .bind(("username", username.clone()))
            .bind(("user_id", permission.user_id))
            .bind(("password_hash", permission.password_hash))
            .bind(("created_at", permission.created_at))
            .bind(("ops", ops))
            .bind(("acls", acls))
            .bind(("limits", limits))
            .bind(("is_admin", permission.is_admin))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) => {
                // Record ids are usernames, so a failed CREATE on an
                // existing id is a duplicate rather than a store fault.
                if self.exists(&username).await? {
                    return Err(DbError::AlreadyExists {
                        entity: ENTITY.into(),
                        id: username,
                    }
                    .into());
                }
                return Err(DbError::Query(e.to_string()).into());
            }
        };

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(&username))?;
        debug!(username = %username, "permission created");

        Ok(row.into_permission()?)
    }

    async fn get_by_username(&self, username: &str) -> KeygateResult<Permission> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $username)")
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(username))?;

        Ok(row.into_permission()?)
    }

    async fn patch(&self, username: &str, patch: PermissionPatch) -> KeygateResult<()> {
        let fields = patch.field_map();
        if fields.is_empty() {
            warn!(username = %username, "empty patch reached the store");
            return Ok(());
        }

        // Field paths come from `PermissionPatch::field_map`, never from
        // client input; values are always bound.
        let sets: Vec<String> = fields
            .keys()
            .enumerate()
            .map(|(i, path)| format!("{path} = $f{i}"))
            .collect();
        let query = format!(
            "UPDATE type::record('permission', $username) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("username", username.to_string()));
        for (i, value) in fields.into_values().enumerate() {
            builder = builder.bind((format!("f{i}"), value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(username).into());
        }
        Ok(())
    }

    async fn set_password_hash(&self, username: &str, password_hash: String) -> KeygateResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::record('permission', $username) SET \
                 password_hash = $password_hash",
            )
            .bind(("username", username.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(username).into());
        }
        Ok(())
    }

    async fn delete(&self, username: &str) -> KeygateResult<()> {
        let result = self
            .db
            .query("DELETE type::record('permission', $username) RETURN BEFORE")
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(username).into());
        }
        Ok(())
    }
}
