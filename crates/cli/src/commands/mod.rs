//! CLI command implementations.

pub mod admin;
pub mod migrate;

use thiserror::Error;

/// Errors that abort a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The command result could not be written.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
