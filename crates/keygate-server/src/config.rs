//! Server configuration read once from the environment at startup.

use keygate_auth::config::{AuthConfig, OwnerAccount};
use keygate_core::models::patch::ImmutableFieldPolicy;
use keygate_db::DbConfig;
use thiserror::Error;

pub const ENV_LISTEN_ADDR: &str = "KEYGATE_LISTEN_ADDR";
pub const ENV_DB_URL: &str = "KEYGATE_DB_URL";
pub const ENV_DB_NAMESPACE: &str = "KEYGATE_DB_NAMESPACE";
pub const ENV_DB_DATABASE: &str = "KEYGATE_DB_DATABASE";
pub const ENV_DB_USERNAME: &str = "KEYGATE_DB_USERNAME";
pub const ENV_DB_PASSWORD: &str = "KEYGATE_DB_PASSWORD";
pub const ENV_ADMIN_USER: &str = "KEYGATE_ADMIN_USER";
pub const ENV_ADMIN_PASSWORD_HASH: &str = "KEYGATE_ADMIN_PASSWORD_HASH";
pub const ENV_PEPPER: &str = "KEYGATE_PEPPER";
pub const ENV_PATCH_IMMUTABLE_FIELDS: &str = "KEYGATE_PATCH_IMMUTABLE_FIELDS";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("environment variable {name} has invalid value `{value}`: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnv(name));

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: get(ENV_DB_URL).unwrap_or(db_defaults.url),
            namespace: get(ENV_DB_NAMESPACE).unwrap_or(db_defaults.namespace),
            database: get(ENV_DB_DATABASE).unwrap_or(db_defaults.database),
            username: get(ENV_DB_USERNAME).unwrap_or(db_defaults.username),
            password: get(ENV_DB_PASSWORD).unwrap_or(db_defaults.password),
        };

        let admin_user = require(ENV_ADMIN_USER)?;
        let admin_hash = require(ENV_ADMIN_PASSWORD_HASH)?;
        if !admin_hash.starts_with("$argon2") {
            return Err(ConfigError::InvalidEnv {
                name: ENV_ADMIN_PASSWORD_HASH,
                value: "<redacted>".into(),
                reason: "expected an Argon2 PHC string",
            });
        }

        let immutable_fields = match get(ENV_PATCH_IMMUTABLE_FIELDS).as_deref() {
            None | Some("reject") => ImmutableFieldPolicy::Reject,
            Some("ignore") => ImmutableFieldPolicy::Ignore,
            Some(other) => {
                return Err(ConfigError::InvalidEnv {
                    name: ENV_PATCH_IMMUTABLE_FIELDS,
                    value: other.to_string(),
                    reason: "expected `reject` or `ignore`",
                });
            }
        };

        Ok(Self {
            listen_addr: get(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into()),
            db,
            auth: AuthConfig {
                pepper: get(ENV_PEPPER),
                owners: vec![OwnerAccount::admin(admin_user, admin_hash)],
                immutable_fields,
            },
        })
    }
}
