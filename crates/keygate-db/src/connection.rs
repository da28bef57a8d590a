//! Opening the permission store.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::SurrealPermissionRepository;
use crate::schema::run_migrations;

/// Where the `permission` table lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "keygate".into(),
            database: "permissions".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Connect to a remote SurrealDB, apply pending migrations and return
/// the permission repository over that connection.
pub async fn connect(
    config: &DbConfig,
) -> Result<SurrealPermissionRepository<Client>, DbError> {
    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "connecting to permission store"
    );

    let db = Surreal::new::<Ws>(&config.url).await?;
    db.signin(Root {
        username: config.username.clone(),
        password: config.password.clone(),
    })
    .await?;
    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await?;

    open(db).await
}

/// Migrate a client whose namespace and database are already selected
/// and wrap it in a repository. Safe to call on every start.
pub async fn open<C: Connection>(
    db: Surreal<C>,
) -> Result<SurrealPermissionRepository<C>, DbError> {
    run_migrations(&db).await?;
    info!("permission store ready");
    Ok(SurrealPermissionRepository::new(db))
}
