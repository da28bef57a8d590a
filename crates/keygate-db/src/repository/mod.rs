//! SurrealDB repository implementations.

mod permission;

pub use permission::SurrealPermissionRepository;
