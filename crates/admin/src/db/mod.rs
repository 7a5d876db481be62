//! Database operations for the admin `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `admin.admin` - Admin accounts (soft-deleted via `deleted`)
//! - `admin.admin_role` - Admin-to-role links (soft-deleted via `deleted`)
//! - `admin.oauth2_access_token` / `admin.oauth2_refresh_token` - Tokens issued
//!   by the OAuth2 service; only revocation is done here
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p mall-cli -- migrate
//! ```

pub mod admin_roles;
pub mod admins;
pub mod oauth2_tokens;
pub mod store;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::AdminConfig;

pub use admin_roles::AdminRoleRepository;
pub use admins::AdminRepository;
pub use oauth2_tokens::OAuth2TokenRepository;
pub use store::{PgAdminStore, PgAdminTransaction, PgTokenRevoker};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool from the service configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &AdminConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .min_connections(config.pool.min_connections)
        .acquire_timeout(config.pool.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
