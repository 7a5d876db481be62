//! Admin account domain types.
//!
//! These types represent validated domain objects for admin accounts, plus
//! the request inputs and response views the service works with.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

use mall_core::{AdminId, AdminStatus, Username};

/// A password hash in PHC string format (`$argon2id$v=19$...`).
///
/// Implements `Debug` manually so hashes never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap an encoded hash.
    #[must_use]
    pub const fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

/// An admin account (domain type).
#[derive(Debug, Clone)]
pub struct Admin {
    /// Unique admin ID.
    pub id: AdminId,
    /// Login name, unique among live accounts.
    pub username: Username,
    /// Display name.
    pub nickname: String,
    /// Salted password hash.
    pub password: HashedPassword,
    /// Whether the account may sign in.
    pub status: AdminStatus,
    /// Soft-delete flag. Stores never return deleted accounts.
    pub deleted: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Admin {
    /// External view of this account (no password hash).
    #[must_use]
    pub fn view(&self) -> AdminView {
        AdminView {
            id: self.id,
            username: self.username.clone(),
            nickname: self.nickname.clone(),
            status: self.status,
            deleted: self.deleted,
            created_at: self.created_at,
        }
    }

    /// Strip the password and status for handing back to a login caller.
    #[must_use]
    pub fn into_authenticated(self) -> AuthenticatedAdmin {
        AuthenticatedAdmin {
            id: self.id,
            username: self.username,
            nickname: self.nickname,
            created_at: self.created_at,
        }
    }
}

/// Fields for inserting a new admin account.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: Username,
    pub nickname: String,
    pub password: HashedPassword,
    pub status: AdminStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial update of an admin row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct AdminChanges {
    pub username: Option<Username>,
    pub nickname: Option<String>,
    pub status: Option<AdminStatus>,
    pub deleted: Option<bool>,
}

impl AdminChanges {
    /// Change only the status.
    #[must_use]
    pub fn status(status: AdminStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Mark the account deleted.
    #[must_use]
    pub fn soft_delete() -> Self {
        Self {
            deleted: Some(true),
            ..Self::default()
        }
    }

    /// Apply these changes to an in-memory copy of the row.
    pub fn apply_to(&self, admin: &mut Admin) {
        if let Some(username) = &self.username {
            admin.username = username.clone();
        }
        if let Some(nickname) = &self.nickname {
            admin.nickname.clone_from(nickname);
        }
        if let Some(status) = self.status {
            admin.status = status;
        }
        if let Some(deleted) = self.deleted {
            admin.deleted = deleted;
        }
    }
}

/// Admin account as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub id: AdminId,
    pub username: Username,
    pub nickname: String,
    pub status: AdminStatus,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful credential check.
///
/// Carries neither the password hash nor the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedAdmin {
    pub id: AdminId,
    pub username: Username,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create an admin account.
#[derive(Debug, Clone)]
pub struct AdminAdd {
    pub username: String,
    pub nickname: String,
    pub password: SecretString,
}

/// Request to change an account's username and nickname.
#[derive(Debug, Clone)]
pub struct AdminUpdate {
    pub id: AdminId,
    pub username: String,
    pub nickname: String,
}

/// Paging request. Pages are zero-based.
#[derive(Debug, Clone, Default)]
pub struct AdminPageQuery {
    /// Substring to match against nicknames. `None` matches everything.
    pub nickname: Option<String>,
    pub page_no: u32,
    pub page_size: u32,
}

impl AdminPageQuery {
    /// Rows to skip: `page_no * page_size`, saturating at `i64::MAX`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page_no).saturating_mul(i64::from(self.page_size))
    }

    /// Maximum rows to return.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// One page of admin accounts plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPage {
    pub admins: Vec<AdminView>,
    pub count: i64,
}
