//! Integration tests for the mall admin service.
//!
//! Provides an in-memory implementation of the admin store and token revoker
//! so [`AdminService`] can be exercised end to end without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mall-integration-tests
//! ```
//!
//! # Transactions
//!
//! [`MemoryStore::begin`] waits for the store lock and hands out a
//! [`MemoryTransaction`] that holds it until commit or drop, so transactions
//! run one at a time the way row locks serialize them in `PostgreSQL`. The
//! transaction works on a private copy of the state: `commit` publishes it,
//! dropping the transaction discards it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use mall_admin::AdminService;
use mall_admin::db::RepositoryError;
use mall_admin::models::{Admin, AdminChanges, AdminRoleLink, NewAdmin};
use mall_admin::services::hash_password;
use mall_admin::store::{AdminStore, AdminTransaction, RevocationError, TokenRevoker};
use mall_core::{AdminId, AdminRoleId, AdminStatus, RoleId, Username};

/// Service wired to the in-memory store.
pub type MemoryAdminService = AdminService<MemoryStore, MemoryRevoker>;

/// A role link together with its soft-delete flag.
#[derive(Debug, Clone)]
pub struct StoredRoleLink {
    pub link: AdminRoleLink,
    pub deleted: bool,
}

/// Committed contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Every admin ever inserted, deleted ones included.
    pub admins: BTreeMap<AdminId, Admin>,
    pub role_links: Vec<StoredRoleLink>,
    /// Admins whose tokens were revoked, in order.
    pub revoked: Vec<AdminId>,
    next_admin_id: i32,
    next_role_link_id: i32,
}

impl MemoryState {
    fn live_admins(&self) -> impl Iterator<Item = &Admin> {
        self.admins.values().filter(|admin| !admin.deleted)
    }

    fn live_by_username(&self, username: &str) -> Option<&Admin> {
        self.live_admins()
            .find(|admin| admin.username.as_str() == username)
    }

    fn matching_nickname<'a>(
        &'a self,
        nickname: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Admin> + 'a {
        self.live_admins()
            .filter(move |admin| nickname.is_none_or(|needle| admin.nickname.contains(needle)))
    }
}

/// In-memory admin store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    write_attempts: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for seeding and inspection between transactions.
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .try_lock()
            .expect("store is held by an open transaction")
    }

    /// Insert an admin directly, bypassing the service.
    ///
    /// # Panics
    ///
    /// Panics if the username is malformed, the password cannot be hashed,
    /// or a transaction is open.
    pub fn seed_admin(
        &self,
        username: &str,
        nickname: &str,
        password: &str,
        status: AdminStatus,
    ) -> AdminId {
        let username = Username::parse(username).expect("seed username must be valid");
        let password = hash_password(password).expect("seed password must hash");

        let mut state = self.lock();
        state.next_admin_id += 1;
        let id = AdminId::new(state.next_admin_id);
        state.admins.insert(
            id,
            Admin {
                id,
                username,
                nickname: nickname.to_owned(),
                password,
                status,
                deleted: false,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Grant `role_id` to an admin directly.
    ///
    /// # Panics
    ///
    /// Panics if a transaction is open.
    pub fn seed_role(&self, admin_id: AdminId, role_id: i32) -> AdminRoleId {
        let mut state = self.lock();
        state.next_role_link_id += 1;
        let id = AdminRoleId::new(state.next_role_link_id);
        state.role_links.push(StoredRoleLink {
            link: AdminRoleLink {
                id,
                admin_id,
                role_id: RoleId::new(role_id),
                created_at: Utc::now(),
            },
            deleted: false,
        });
        id
    }

    /// Copy of the committed state.
    ///
    /// # Panics
    ///
    /// Panics if a transaction is open.
    #[must_use]
    pub fn snapshot(&self) -> MemoryState {
        self.lock().clone()
    }

    /// Committed admin row, deleted or not.
    ///
    /// # Panics
    ///
    /// Panics if a transaction is open.
    #[must_use]
    pub fn admin(&self, id: AdminId) -> Option<Admin> {
        self.lock().admins.get(&id).cloned()
    }

    /// Number of write calls made through any transaction, committed or not.
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let committed = Arc::clone(&self.state).lock_owned().await;
        Ok(MemoryTransaction {
            working: MemoryState::clone(&committed),
            committed,
            write_attempts: Arc::clone(&self.write_attempts),
        })
    }
}

/// Exclusive transaction on a [`MemoryStore`].
///
/// Holds the store lock for its whole life. Writes go to a private copy that
/// is discarded on drop unless committed.
#[derive(Debug)]
pub struct MemoryTransaction {
    working: MemoryState,
    committed: OwnedMutexGuard<MemoryState>,
    write_attempts: Arc<AtomicUsize>,
}

impl MemoryTransaction {
    fn record_write(&self) {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a token revocation as part of this transaction.
    pub fn record_revocation(&mut self, admin_id: AdminId) {
        self.record_write();
        self.working.revoked.push(admin_id);
    }
}

#[async_trait]
impl AdminTransaction for MemoryTransaction {
    async fn select_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Admin>, RepositoryError> {
        Ok(self.working.live_by_username(username).cloned())
    }

    async fn select_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        Ok(self
            .working
            .admins
            .get(&id)
            .filter(|admin| !admin.deleted)
            .cloned())
    }

    async fn lock_by_id(&mut self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        self.select_by_id(id).await
    }

    async fn select_list_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Admin>, RepositoryError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self
            .working
            .matching_nickname(nickname)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn select_count_by_nickname_like(
        &mut self,
        nickname: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        let count = self.working.matching_nickname(nickname).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn insert(&mut self, admin: &NewAdmin) -> Result<Admin, RepositoryError> {
        self.record_write();

        if self
            .working
            .live_by_username(admin.username.as_str())
            .is_some()
        {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        self.working.next_admin_id += 1;
        let id = AdminId::new(self.working.next_admin_id);
        let row = Admin {
            id,
            username: admin.username.clone(),
            nickname: admin.nickname.clone(),
            password: admin.password.clone(),
            status: admin.status,
            deleted: false,
            created_at: admin.created_at,
        };
        self.working.admins.insert(id, row.clone());
        Ok(row)
    }

    async fn update(
        &mut self,
        id: AdminId,
        changes: &AdminChanges,
    ) -> Result<(), RepositoryError> {
        self.record_write();

        if let Some(username) = &changes.username
            && self
                .working
                .live_by_username(username.as_str())
                .is_some_and(|owner| owner.id != id)
        {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let admin = self
            .working
            .admins
            .get_mut(&id)
            .filter(|admin| !admin.deleted)
            .ok_or(RepositoryError::NotFound)?;
        changes.apply_to(admin);
        Ok(())
    }

    async fn select_roles_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<Vec<AdminRoleLink>, RepositoryError> {
        let mut links: Vec<_> = self
            .working
            .role_links
            .iter()
            .filter(|stored| !stored.deleted && stored.link.admin_id == admin_id)
            .map(|stored| stored.link.clone())
            .collect();
        links.sort_by_key(|link| link.id);
        Ok(links)
    }

    async fn update_roles_to_deleted_by_admin_id(
        &mut self,
        admin_id: AdminId,
    ) -> Result<u64, RepositoryError> {
        self.record_write();

        let mut affected = 0;
        for stored in &mut self.working.role_links {
            if !stored.deleted && stored.link.admin_id == admin_id {
                stored.deleted = true;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn commit(mut self) -> Result<(), RepositoryError> {
        *self.committed = self.working;
        Ok(())
    }
}

/// In-memory token revoker that can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryRevoker {
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MemoryRevoker {
    /// A revoker that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A revoker whose token service is unreachable.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// How many times `remove_tokens` was called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRevoker<MemoryTransaction> for MemoryRevoker {
    async fn remove_tokens(
        &self,
        tx: &mut MemoryTransaction,
        admin_id: AdminId,
    ) -> Result<(), RevocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(RevocationError::Unavailable(
                "token service offline".to_owned(),
            ));
        }

        tx.record_revocation(admin_id);
        Ok(())
    }
}

/// Build a service over `store` and `revoker`. Both share state with the
/// values passed in, so tests can inspect them afterwards.
#[must_use]
pub fn service(store: &MemoryStore, revoker: &MemoryRevoker) -> MemoryAdminService {
    AdminService::new(store.clone(), revoker.clone())
}
