//! Admin-role link repository.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use mall_core::{AdminId, AdminRoleId, RoleId};

use super::RepositoryError;
use crate::models::AdminRoleLink;

/// Internal row type for `PostgreSQL` admin-role queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminRoleRow {
    id: i32,
    admin_id: i32,
    role_id: i32,
    created_at: DateTime<Utc>,
}

impl From<AdminRoleRow> for AdminRoleLink {
    fn from(row: AdminRoleRow) -> Self {
        Self {
            id: AdminRoleId::new(row.id),
            admin_id: AdminId::new(row.admin_id),
            role_id: RoleId::new(row.role_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for admin-role links.
pub struct AdminRoleRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AdminRoleRepository<'c> {
    /// Create a new admin-role repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get the live role links of an admin, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<Vec<AdminRoleLink>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminRoleRow>(
            r"
            SELECT id, admin_id, role_id, created_at
            FROM admin.admin_role
            WHERE admin_id = $1 AND NOT deleted
            ORDER BY id ASC
            ",
        )
        .bind(admin_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Soft-delete every live role link of an admin.
    ///
    /// Returns the number of links marked deleted (zero is not an error).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_deleted_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admin.admin_role
            SET deleted = TRUE
            WHERE admin_id = $1 AND NOT deleted
            ",
        )
        .bind(admin_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
