//! keygate auth: the request guard pipeline, credential resolution,
//! and the permission service.

pub mod authenticator;
pub mod config;
pub mod context;
pub mod error;
pub mod guards;
pub mod pipeline;
pub mod service;

pub use authenticator::{Authenticator, StoreAuthenticator};
pub use config::{AuthConfig, OwnerAccount};
pub use context::{BasicCredentials, Endpoint, RequestContext};
pub use error::AuthError;
pub use pipeline::Pipeline;
pub use service::{PermissionService, RotatedPassword};
