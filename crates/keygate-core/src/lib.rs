//! keygate core: the permission model, its construction and patch
//! builders, credential hashing, the error taxonomy, and the storage
//! trait the rest of the workspace is generic over.

pub mod credential;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{ErrorKind, KeygateError, KeygateResult};
