//! Admin account status.

use serde::{Deserialize, Serialize};

/// Error returned when a numeric status code is neither enabled nor disabled.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("status must be enabled (1) or disabled (2), got {0}")]
pub struct InvalidStatus(pub i32);

/// Whether an admin account may sign in.
///
/// Stored as a `SMALLINT`: `1` = enabled, `2` = disabled. Transitions go both
/// ways, and only a disabled account may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    #[default]
    Enabled,
    Disabled,
}

impl AdminStatus {
    /// Numeric code stored in the `SMALLINT` status column.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Enabled => 1,
            Self::Disabled => 2,
        }
    }

    /// Returns `true` for [`AdminStatus::Enabled`].
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl TryFrom<i32> for AdminStatus {
    type Error = InvalidStatus;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Enabled),
            2 => Ok(Self::Disabled),
            other => Err(InvalidStatus(other)),
        }
    }
}

impl std::fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}
