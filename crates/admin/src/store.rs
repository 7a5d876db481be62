//! Persistence and revocation seams used by [`AdminService`](crate::services::AdminService).
//!
//! Every service call runs inside one [`AdminTransaction`]. Dropping a
//! transaction without calling [`AdminTransaction::commit`] rolls it back,
//! which is how a failed token revocation undoes the status write that
//! preceded it.
//!
//! The `PostgreSQL` implementations live in [`crate::db`].

use async_trait::async_trait;
use thiserror::Error;

use mall_core::AdminId;

use crate::db::RepositoryError;
use crate::models::{Admin, AdminChanges, AdminRoleLink, NewAdmin};

/// Source of admin-store transactions.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Transaction type handed out by [`AdminStore::begin`].
    type Tx: AdminTransaction;

    /// Start a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available.
    async fn begin(&self) -> Result<Self::Tx, RepositoryError>;
}

/// Admin record and admin-role link operations inside one transaction.
///
/// All reads skip soft-deleted rows.
#[async_trait]
pub trait AdminTransaction: Send {
    /// Find a live admin by username.
    async fn select_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Admin>, RepositoryError>;

    /// Find a live admin by ID.
    async fn select_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError>;

    /// Find a live admin by ID and hold a row lock until the transaction ends.
    async fn lock_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError>;

    /// Page through admins whose nickname contains `nickname`.
    async fn select_list_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Admin>, RepositoryError>;

    /// Count admins whose nickname contains `nickname`.
    async fn select_count_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
    ) -> Result<i64, RepositoryError>;

    /// Insert a new admin.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn insert(&mut self, admin: &NewAdmin) -> Result<Admin, RepositoryError>;

    /// Apply a partial update to a live admin.
    ///
    /// Returns `RepositoryError::NotFound` if no live row matched and
    /// `RepositoryError::Conflict` if a new username is taken.
    async fn update(&mut self, id: AdminId, changes: &AdminChanges)
    -> Result<(), RepositoryError>;

    /// Live role links of an admin.
    async fn select_roles_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<Vec<AdminRoleLink>, RepositoryError>;

    /// Soft-delete every role link of an admin. Returns the number of links.
    async fn update_roles_to_deleted_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<u64, RepositoryError>;

    /// Make every write of this transaction durable.
    async fn commit(self) -> Result<(), RepositoryError>;
}

/// Errors raised by a [`TokenRevoker`].
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The token store rejected the update.
    #[error("token store error: {0}")]
    Repository(#[from] RepositoryError),

    /// The token service could not be reached.
    #[error("token service unavailable: {0}")]
    Unavailable(String),
}

/// Invalidates the sessions of an admin.
///
/// The revoker runs inside the caller's transaction so the revocation and
/// the status change commit or roll back together.
#[async_trait]
pub trait TokenRevoker<Tx: Send>: Send + Sync {
    /// Invalidate every token issued to `admin_id`.
    async fn remove_tokens(&self, tx: &mut Tx, admin_id: AdminId) -> Result<(), RevocationError>;
}
