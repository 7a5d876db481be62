//! Admin username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is shorter than the minimum length.
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input is longer than the maximum length.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than ASCII letters and digits.
    #[error("username may only contain letters and digits")]
    InvalidCharacter,
}

/// An admin login name.
///
/// The username is the business key of an admin account: it is unique among
/// accounts that have not been deleted.
///
/// ## Constraints
///
/// - Length: 4-16 characters
/// - ASCII letters and digits only
///
/// ## Examples
///
/// ```
/// use mall_core::Username;
///
/// assert!(Username::parse("admin01").is_ok());
///
/// assert!(Username::parse("abc").is_err());        // too short
/// assert!(Username::parse("has space").is_err());  // invalid character
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 4;

    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 16;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is outside 4-16 characters or contains
    /// anything other than ASCII letters and digits.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.len() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Wrap a value read back from storage without re-validating it.
    #[must_use]
    pub const fn from_trusted(s: String) -> Self {
        Self(s)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_usernames() {
        assert!(Username::parse("admin").is_ok());
        assert!(Username::parse("ADMIN2024").is_ok());
        assert!(Username::parse("abcd").is_ok());
        assert!(Username::parse("a234567890123456").is_ok());
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            Username::parse("abc"),
            Err(UsernameError::TooShort { min: 4 })
        );
        assert!(matches!(
            Username::parse(""),
            Err(UsernameError::TooShort { .. })
        ));
    }

    #[test]
    fn test_parse_too_long() {
        assert_eq!(
            Username::parse("a2345678901234567"),
            Err(UsernameError::TooLong { max: 16 })
        );
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert_eq!(
            Username::parse("li_lei"),
            Err(UsernameError::InvalidCharacter)
        );
        assert_eq!(
            Username::parse("admin@x"),
            Err(UsernameError::InvalidCharacter)
        );
        assert_eq!(
            Username::parse("管理员账号"),
            Err(UsernameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_display_and_as_str() {
        let username = Username::parse("yunai").unwrap();
        assert_eq!(username.as_str(), "yunai");
        assert_eq!(username.to_string(), "yunai");
        assert_eq!(username.into_inner(), "yunai");
    }

    #[test]
    fn test_from_str() {
        let username: Username = "operator1".parse().unwrap();
        assert_eq!(username.as_ref(), "operator1");
    }
}
