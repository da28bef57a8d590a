//! Authentication and authorization failures raised by the pipeline.

use keygate_core::error::KeygateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credentials not provided")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("credential has expired")]
    CredentialExpired,

    #[error("operation `{0}` is not permitted for this credential")]
    OpDenied(String),

    #[error("ACL `{0}` is not permitted for this credential")]
    AclDenied(String),

    #[error("admin privileges are required")]
    AdminRequired,
}

impl From<AuthError> for KeygateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials
            | AuthError::InvalidCredentials
            | AuthError::CredentialExpired => KeygateError::Unauthenticated {
                reason: err.to_string(),
            },
            AuthError::OpDenied(_) | AuthError::AclDenied(_) | AuthError::AdminRequired => {
                KeygateError::Forbidden {
                    reason: err.to_string(),
                }
            }
        }
    }
}
