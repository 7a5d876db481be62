//! Revocation of OAuth2 tokens issued to admins.
//!
//! Tokens are issued and validated by the OAuth2 service. This repository
//! only flips `valid` to `FALSE`, which that service treats as revoked.

use sqlx::PgConnection;

use mall_core::AdminId;

use super::RepositoryError;

/// Repository for invalidating admin tokens.
pub struct OAuth2TokenRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OAuth2TokenRepository<'c> {
    /// Create a new token repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Invalidate every access and refresh token of an admin.
    ///
    /// Returns the total number of tokens invalidated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either update fails.
    pub async fn invalidate_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<u64, RepositoryError> {
        let access = sqlx::query(
            r"
            UPDATE admin.oauth2_access_token
            SET valid = FALSE
            WHERE admin_id = $1 AND valid
            ",
        )
        .bind(admin_id)
        .execute(&mut *self.conn)
        .await?;

        let refresh = sqlx::query(
            r"
            UPDATE admin.oauth2_refresh_token
            SET valid = FALSE
            WHERE admin_id = $1 AND valid
            ",
        )
        .bind(admin_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(access.rows_affected() + refresh.rows_affected())
    }
}
