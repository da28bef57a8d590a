//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    keygate_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("permission"), "missing permission table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    keygate_db::run_migrations(&db).await.unwrap();
    keygate_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn open_migrates_and_returns_working_repository() {
    use keygate_core::models::permission::PermissionBuilder;
    use keygate_core::repository::PermissionRepository;

    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    // Reopening an already migrated database must not fail.
    let first = keygate_db::open(db.clone()).await.unwrap();
    let repo = keygate_db::open(db).await.unwrap();

    let permission = PermissionBuilder::new("alice").build(None).unwrap().permission;
    repo.create(permission.clone()).await.unwrap();

    let fetched = first.get_by_username(&permission.username).await.unwrap();
    assert_eq!(fetched.user_id, "alice");
    assert_eq!(fetched.password_hash, permission.password_hash);
}
