//! Admin account repository for database operations.
//!
//! Runs against a borrowed connection so every call participates in the
//! caller's transaction. Queries use the runtime `sqlx::query_as` API; every
//! read filters out soft-deleted rows.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use mall_core::{AdminId, AdminStatus, Username};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Admin, AdminChanges, HashedPassword, NewAdmin};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` admin queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: i32,
    username: String,
    nickname: String,
    password: String,
    status: i16,
    deleted: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let status = AdminStatus::try_from(i32::from(row.status)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status for admin {}: {e}", row.id))
        })?;

        Ok(Self {
            id: AdminId::new(row.id),
            username: Username::from_trusted(row.username),
            nickname: row.nickname,
            password: HashedPassword::new(row.password),
            status,
            deleted: row.deleted,
            created_at: row.created_at,
        })
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin account database operations.
pub struct AdminRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AdminRepository<'c> {
    /// Create a new admin repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a live admin by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, username, nickname, password, status, deleted, created_at
            FROM admin.admin
            WHERE username = $1 AND NOT deleted
            ",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a live admin by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, username, nickname, password, status, deleted, created_at
            FROM admin.admin
            WHERE id = $1 AND NOT deleted
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a live admin by ID and lock the row until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id_for_update(
        &mut self,
        id: AdminId,
    ) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, username, nickname, password, status, deleted, created_at
            FROM admin.admin
            WHERE id = $1 AND NOT deleted
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List live admins whose nickname contains `nickname`, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Admin>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, username, nickname, password, status, deleted, created_at
            FROM admin.admin
            WHERE NOT deleted
              AND ($1::text IS NULL OR nickname LIKE $1)
            ORDER BY id ASC
            OFFSET $2
            LIMIT $3
            ",
        )
        .bind(nickname.map(contains_pattern))
        .bind(offset)
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count live admins whose nickname contains `nickname`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM admin.admin
            WHERE NOT deleted
              AND ($1::text IS NULL OR nickname LIKE $1)
            ",
        )
        .bind(nickname.map(contains_pattern))
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    /// Create a new admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is already used by a live admin.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&mut self, admin: &NewAdmin) -> Result<Admin, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            INSERT INTO admin.admin (username, nickname, password, status, deleted, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING id, username, nickname, password, status, deleted, created_at
            ",
        )
        .bind(admin.username.as_str())
        .bind(&admin.nickname)
        .bind(admin.password.as_str())
        .bind(admin.status.code())
        .bind(admin.created_at)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| map_unique_violation(e, "username"))?;

        row.try_into()
    }

    /// Apply a partial update to a live admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the admin doesn't exist or is deleted.
    /// Returns `RepositoryError::Conflict` if the new username is already used.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &mut self,
        id: AdminId,
        changes: &AdminChanges,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admin.admin
            SET username = COALESCE($2, username),
                nickname = COALESCE($3, nickname),
                status   = COALESCE($4, status),
                deleted  = COALESCE($5, deleted)
            WHERE id = $1 AND NOT deleted
            ",
        )
        .bind(id)
        .bind(changes.username.as_ref().map(Username::as_str))
        .bind(changes.nickname.as_deref())
        .bind(changes.status.map(AdminStatus::code))
        .bind(changes.deleted)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| map_unique_violation(e, "username"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
