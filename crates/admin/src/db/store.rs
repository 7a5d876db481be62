//! `PostgreSQL` implementations of the store and revoker seams.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use mall_core::AdminId;

use super::{AdminRepository, AdminRoleRepository, OAuth2TokenRepository, RepositoryError};
use crate::models::{Admin, AdminChanges, AdminRoleLink, NewAdmin};
use crate::store::{AdminStore, AdminTransaction, RevocationError, TokenRevoker};

/// Admin store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    /// Create a store on an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    type Tx = PgAdminTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(PgAdminTransaction { tx })
    }
}

/// An open `PostgreSQL` transaction. Rolled back on drop unless committed.
pub struct PgAdminTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgAdminTransaction {
    /// Connection of this transaction, for collaborators that enlist in it.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.tx
    }
}

#[async_trait]
impl AdminTransaction for PgAdminTransaction {
    async fn select_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Admin>, RepositoryError> {
        AdminRepository::new(&mut self.tx)
            .get_by_username(username)
            .await
    }

    async fn select_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        AdminRepository::new(&mut self.tx).get_by_id(id).await
    }

    async fn lock_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        AdminRepository::new(&mut self.tx)
            .get_by_id_for_update(id)
            .await
    }

    async fn select_list_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Admin>, RepositoryError> {
        AdminRepository::new(&mut self.tx)
            .list_by_nickname_like(nickname, offset, limit)
            .await
    }

    async fn select_count_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        AdminRepository::new(&mut self.tx)
            .count_by_nickname_like(nickname)
            .await
    }

    async fn insert(&mut self, admin: &NewAdmin) -> Result<Admin, RepositoryError> {
        AdminRepository::new(&mut self.tx).create(admin).await
    }

    async fn update(
        &mut self,
        id: AdminId,
        changes: &AdminChanges,
    ) -> Result<(), RepositoryError> {
        AdminRepository::new(&mut self.tx).update(id, changes).await
    }

    async fn select_roles_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<Vec<AdminRoleLink>, RepositoryError> {
        AdminRoleRepository::new(&mut self.tx)
            .list_by_admin_id(admin_id)
            .await
    }

    async fn update_roles_to_deleted_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<u64, RepositoryError> {
        AdminRoleRepository::new(&mut self.tx)
            .mark_deleted_by_admin_id(admin_id)
            .await
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Revokes admin tokens stored in the same database as the admin rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgTokenRevoker;

#[async_trait]
impl TokenRevoker<PgAdminTransaction> for PgTokenRevoker {
    async fn remove_tokens(
        &self,
        tx: &mut PgAdminTransaction,
        admin_id: AdminId,
    ) -> Result<(), RevocationError> {
        let revoked = OAuth2TokenRepository::new(tx.connection())
            .invalidate_by_admin_id(admin_id)
            .await?;

        tracing::debug!(admin_id = %admin_id, revoked, "Invalidated admin tokens");
        Ok(())
    }
}
