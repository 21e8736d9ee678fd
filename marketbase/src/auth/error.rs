use thiserror::Error;

/// Seller record field the identity store keeps unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    SellerId,
    Email,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::SellerId => write!(f, "seller id"),
            UniqueField::Email => write!(f, "email"),
        }
    }
}

/// Stable classification callers branch on instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authentication,
    Forbidden,
    Unauthenticated,
    Dependency,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Seller not found")]
    NotFound,

    #[error("Seller already exists")]
    DuplicateEmail,

    #[error("Duplicate {0}")]
    DuplicateKey(UniqueField),

    #[error("Could not allocate a unique seller id after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("Email is already verified")]
    AlreadyVerified,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid verification token")]
    InvalidToken,

    #[error("Verification token has expired")]
    TokenExpired,

    #[error("Account not verified")]
    NotVerified,

    #[error("Invalid seller ID")]
    InvalidSellerId,

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Forbidden: Insufficient permissions")]
    Forbidden,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Seller logged out but the session could not be invalidated: {0}")]
    SessionInvalidation(String),

    #[error("Background task failed: {0}")]
    TaskError(String),

    #[error("Verification expiry out of range: {0}")]
    ExpiryOutOfRange(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::DuplicateEmail
            | AuthError::DuplicateKey(_)
            | AuthError::AllocationExhausted { .. }
            | AuthError::AlreadyVerified => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::NotVerified
            | AuthError::InvalidSellerId => ErrorKind::Authentication,
            AuthError::Unauthenticated => ErrorKind::Unauthenticated,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::StorageError(_)
            | AuthError::SerializationError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::SessionError(_)
            | AuthError::SessionInvalidation(_)
            | AuthError::TaskError(_)
            | AuthError::ExpiryOutOfRange(_) => ErrorKind::Dependency,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AuthError::Validation(message.into())
    }
}

impl From<sled::Error> for AuthError {
    fn from(err: sled::Error) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::SerializationError(err.to_string())
    }
}

impl From<shared::Error> for AuthError {
    fn from(err: shared::Error) -> Self {
        AuthError::SessionError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::TaskError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_rejections_share_a_kind() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::InvalidToken,
            AuthError::TokenExpired,
            AuthError::NotVerified,
        ] {
            assert_eq!(err.kind(), ErrorKind::Authentication);
        }
    }

    #[test]
    fn test_dependency_failures() {
        let err: AuthError = shared::Error::Session("cache closed".into()).into();
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert_eq!(
            AuthError::SessionInvalidation("gone".into()).kind(),
            ErrorKind::Dependency
        );
        assert_eq!(
            AuthError::ExpiryOutOfRange("ttl".into()).kind(),
            ErrorKind::Dependency
        );
    }

    #[test]
    fn test_conflicts() {
        assert_eq!(AuthError::DuplicateEmail.kind(), ErrorKind::Conflict);
        assert_eq!(
            AuthError::AllocationExhausted { attempts: 3 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            AuthError::DuplicateKey(UniqueField::SellerId).to_string(),
            "Duplicate seller id"
        );
    }
}
