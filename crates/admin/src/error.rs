//! Unified result wrapper for admin service operations.
//!
//! Every exposed operation can be turned into a [`CommonResult`]: code `0`
//! with a payload on success, or an error code with a message. Unexpected
//! failures are reported to Sentry and logged, and callers only see a
//! generic message.

use serde::Serialize;

use crate::services::AdminServiceError;

/// Numeric result codes.
pub mod codes {
    /// Operation succeeded.
    pub const SUCCESS: i32 = 0;

    /// Unexpected server-side failure.
    pub const SYS_ERROR: i32 = 1_001_001_000;
    /// A request parameter failed validation.
    pub const VALIDATION_REQUEST_PARAM_ERROR: i32 = 1_001_001_001;

    /// No live admin with that username or ID.
    pub const ADMIN_USERNAME_NOT_REGISTERED: i32 = 1_002_002_000;
    /// Password does not match.
    pub const ADMIN_PASSWORD_ERROR: i32 = 1_002_002_001;
    /// Account is disabled.
    pub const ADMIN_IS_DISABLE: i32 = 1_002_002_002;
    /// Username already used by another live admin.
    pub const ADMIN_USERNAME_EXISTS: i32 = 1_002_002_003;
    /// Account is already in the requested status.
    pub const ADMIN_STATUS_EQUALS: i32 = 1_002_002_004;
    /// Only disabled accounts can be deleted.
    pub const ADMIN_DELETE_ONLY_DISABLE: i32 = 1_002_002_005;
}

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Tagged result returned to callers of the admin service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonResult<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> CommonResult<T> {
    /// Successful result carrying `data`.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            code: codes::SUCCESS,
            message: String::new(),
            data: Some(data),
        }
    }

    /// Failed result.
    #[must_use]
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Returns `true` if the code is [`codes::SUCCESS`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == codes::SUCCESS
    }
}

impl<T> From<Result<T, AdminServiceError>> for CommonResult<T> {
    fn from(result: Result<T, AdminServiceError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) if err.is_internal() => {
                let event_id = sentry::capture_error(&err);
                tracing::error!(
                    error = %err,
                    sentry_event_id = %event_id,
                    "Admin service error"
                );
                // Don't expose internal error details to callers
                Self::error(err.code(), INTERNAL_ERROR_MESSAGE)
            }
            Err(err) => Self::error(err.code(), err.to_string()),
        }
    }
}
