//! Error types for keygate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeygateError {
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("Authentication failed: {reason}")]
    Unauthenticated { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client-facing error class. Every [`KeygateError`] maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl KeygateError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn permission_not_found(username: &str) -> Self {
        Self::NotFound {
            entity: "permission".into(),
            id: username.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type KeygateResult<T> = Result<T, KeygateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_classify_as_internal() {
        assert_eq!(
            KeygateError::Database("connection reset".into()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            KeygateError::Crypto("bad hash".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn validation_message_names_field() {
        let err = KeygateError::validation("ops", "unknown operation `fly`");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("`ops`"));
    }
}
