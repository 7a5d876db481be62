//! Admin service error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::codes;
use crate::services::password::PasswordHashError;
use crate::store::RevocationError;

/// Errors that can occur during admin account operations.
///
/// The first group are expected outcomes a caller should act on; the last
/// group are unexpected failures that abort the request.
#[derive(Debug, Error)]
pub enum AdminServiceError {
    /// No live admin with that username or ID.
    #[error("admin account does not exist")]
    UsernameNotRegistered,

    /// Password does not match the stored hash.
    #[error("incorrect password")]
    PasswordError,

    /// The account is disabled.
    #[error("admin account is disabled")]
    AccountDisabled,

    /// Username already used by another live admin.
    #[error("username already exists")]
    UsernameExists,

    /// The account is already in the requested status.
    #[error("admin account is already in that status")]
    StatusEquals,

    /// Only disabled accounts can be deleted.
    #[error("only disabled admin accounts can be deleted")]
    DeleteOnlyDisabled,

    /// A request parameter failed validation.
    #[error("invalid request parameter: {0}")]
    Validation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session revocation failed.
    #[error("token revocation failed: {0}")]
    Revocation(#[from] RevocationError),

    /// Password hashing failed.
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
}

impl AdminServiceError {
    /// Numeric result code for this error.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::UsernameNotRegistered => codes::ADMIN_USERNAME_NOT_REGISTERED,
            Self::PasswordError => codes::ADMIN_PASSWORD_ERROR,
            Self::AccountDisabled => codes::ADMIN_IS_DISABLE,
            Self::UsernameExists => codes::ADMIN_USERNAME_EXISTS,
            Self::StatusEquals => codes::ADMIN_STATUS_EQUALS,
            Self::DeleteOnlyDisabled => codes::ADMIN_DELETE_ONLY_DISABLE,
            Self::Validation(_) => codes::VALIDATION_REQUEST_PARAM_ERROR,
            Self::Repository(_) | Self::Revocation(_) | Self::PasswordHash(_) => codes::SYS_ERROR,
        }
    }

    /// Returns `true` for failures the caller did not cause.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Repository(_) | Self::Revocation(_) | Self::PasswordHash(_)
        )
    }
}
