//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mall-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database
//!
//! # Migration Files
//!
//! Admin migrations: `crates/admin/migrations/`

use mall_admin::config::AdminConfig;
use mall_admin::db;

use super::CommandError;

/// Run admin database migrations.
///
/// # Errors
///
/// Returns `CommandError::Database` if the database is unreachable and
/// `CommandError::Migration` if a migration fails to apply.
pub async fn run(config: &AdminConfig) -> Result<(), CommandError> {
    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(config).await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
