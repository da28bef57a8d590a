//! keygate database: SurrealDB connection management, schema
//! migrations, and the permission repository.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, connect, open};
pub use error::DbError;
pub use schema::run_migrations;
