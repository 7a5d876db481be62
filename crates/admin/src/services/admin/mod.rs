//! Admin account service.
//!
//! Validates credentials, pages accounts, and drives the account lifecycle:
//! `enabled <-> disabled`, then `deleted` (only from `disabled`). Disabling an
//! account revokes its tokens in the same transaction as the status write.

mod error;

pub use error::AdminServiceError;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use mall_core::{AdminId, AdminStatus, Username};

use super::password;
use crate::db::RepositoryError;
use crate::models::{
    AdminAdd, AdminChanges, AdminPage, AdminPageQuery, AdminRoleLink, AdminUpdate, AdminView,
    AuthenticatedAdmin, NewAdmin,
};
use crate::store::{AdminStore, AdminTransaction, TokenRevoker};

/// Password length bounds for new accounts.
const MIN_PASSWORD_LENGTH: usize = 4;
const MAX_PASSWORD_LENGTH: usize = 16;

/// Longest accepted nickname, in characters.
const MAX_NICKNAME_LENGTH: usize = 64;

/// Admin account service.
///
/// Holds the admin store and the token revoker it was built with. The CLI
/// wires it to `PostgreSQL`; tests wire it to an in-memory store.
pub struct AdminService<S, R> {
    store: S,
    revoker: R,
}

impl<S, R> AdminService<S, R> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(store: S, revoker: R) -> Self {
        Self { store, revoker }
    }
}

impl<S, R> AdminService<S, R>
where
    S: AdminStore,
    R: TokenRevoker<S::Tx>,
{
    // =========================================================================
    // Queries
    // =========================================================================

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::UsernameNotRegistered` if no live admin has that username.
    /// Returns `AdminServiceError::PasswordError` if the password is wrong.
    /// Returns `AdminServiceError::AccountDisabled` if the account is disabled.
    pub async fn validate_admin(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedAdmin, AdminServiceError> {
        let mut tx = self.store.begin().await?;
        let admin = tx.select_by_username(username).await?;
        tx.commit().await?;

        let Some(admin) = admin else {
            tracing::debug!(username, "Login rejected: unknown username");
            return Err(AdminServiceError::UsernameNotRegistered);
        };

        if !password::verify_password(password.expose_secret(), &admin.password) {
            tracing::debug!(admin_id = %admin.id, "Login rejected: wrong password");
            return Err(AdminServiceError::PasswordError);
        }

        if !admin.status.is_enabled() {
            tracing::debug!(admin_id = %admin.id, "Login rejected: account disabled");
            return Err(AdminServiceError::AccountDisabled);
        }

        Ok(admin.into_authenticated())
    }

    /// Live role links of an admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Repository` if the lookup fails.
    pub async fn get_admin_roles(
        &self,
        admin_id: AdminId,
    ) -> Result<Vec<AdminRoleLink>, AdminServiceError> {
        let mut tx = self.store.begin().await?;
        let roles = tx.select_roles_by_admin_id(admin_id).await?;
        tx.commit().await?;
        Ok(roles)
    }

    /// One page of admins matching a nickname filter, plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Repository` if either query fails.
    pub async fn get_admin_page(
        &self,
        query: &AdminPageQuery,
    ) -> Result<AdminPage, AdminServiceError> {
        let nickname = query.nickname.as_deref();

        let mut tx = self.store.begin().await?;
        let admins = tx
            .select_list_by_nickname_like(nickname, query.offset(), query.limit())
            .await?;
        let count = tx.select_count_by_nickname_like(nickname).await?;
        tx.commit().await?;

        Ok(AdminPage {
            admins: admins.iter().map(crate::models::Admin::view).collect(),
            count,
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Create an enabled admin account.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Validation` if a field is malformed.
    /// Returns `AdminServiceError::UsernameExists` if the username is taken.
    pub async fn add_admin(
        &self,
        actor: AdminId,
        input: AdminAdd,
    ) -> Result<AdminView, AdminServiceError> {
        let username = parse_username(&input.username)?;
        let nickname = parse_nickname(&input.nickname)?;
        validate_password(input.password.expose_secret())?;

        let mut tx = self.store.begin().await?;

        if tx.select_by_username(username.as_str()).await?.is_some() {
            tracing::debug!(actor = %actor, username = %username, "Add rejected: username exists");
            return Err(AdminServiceError::UsernameExists);
        }

        let new_admin = NewAdmin {
            username,
            nickname,
            password: password::hash_password(input.password.expose_secret())?,
            status: AdminStatus::Enabled,
            created_at: Utc::now(),
        };
        let admin = tx
            .insert(&new_admin)
            .await
            .map_err(username_conflict)?;
        tx.commit().await?;

        tracing::info!(
            actor = %actor,
            admin_id = %admin.id,
            username = %admin.username,
            "Admin created"
        );

        Ok(admin.view())
    }

    /// Change an admin's username and nickname.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Validation` if a field is malformed.
    /// Returns `AdminServiceError::UsernameNotRegistered` if the admin doesn't exist.
    /// Returns `AdminServiceError::UsernameExists` if another admin has the username.
    pub async fn update_admin(
        &self,
        actor: AdminId,
        input: AdminUpdate,
    ) -> Result<(), AdminServiceError> {
        let username = parse_username(&input.username)?;
        let nickname = parse_nickname(&input.nickname)?;

        let mut tx = self.store.begin().await?;

        if tx.lock_by_id(input.id).await?.is_none() {
            return Err(AdminServiceError::UsernameNotRegistered);
        }

        if let Some(owner) = tx.select_by_username(username.as_str()).await?
            && owner.id != input.id
        {
            tracing::debug!(
                actor = %actor,
                admin_id = %input.id,
                username = %username,
                "Update rejected: username exists"
            );
            return Err(AdminServiceError::UsernameExists);
        }

        let changes = AdminChanges {
            username: Some(username),
            nickname: Some(nickname),
            ..AdminChanges::default()
        };
        tx.update(input.id, &changes)
            .await
            .map_err(username_conflict)?;
        tx.commit().await?;

        tracing::info!(actor = %actor, admin_id = %input.id, "Admin updated");
        Ok(())
    }

    /// Enable or disable an admin. Disabling also revokes the admin's tokens.
    ///
    /// `status` is the numeric code (`1` enabled, `2` disabled).
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::Validation` if `status` is not 1 or 2.
    /// Returns `AdminServiceError::UsernameNotRegistered` if the admin doesn't exist.
    /// Returns `AdminServiceError::StatusEquals` if the admin already has that status.
    /// Returns `AdminServiceError::Revocation` if token revocation fails; the
    /// status change is rolled back.
    pub async fn update_admin_status(
        &self,
        actor: AdminId,
        target: AdminId,
        status: i32,
    ) -> Result<(), AdminServiceError> {
        let status = AdminStatus::try_from(status)
            .map_err(|e| AdminServiceError::Validation(e.to_string()))?;

        let mut tx = self.store.begin().await?;

        let admin = tx
            .lock_by_id(target)
            .await?
            .ok_or(AdminServiceError::UsernameNotRegistered)?;

        if admin.status == status {
            return Err(AdminServiceError::StatusEquals);
        }

        tx.update(target, &AdminChanges::status(status)).await?;

        if status == AdminStatus::Disabled {
            self.revoker
                .remove_tokens(&mut tx, target)
                .await
                .inspect_err(|e| {
                    tracing::warn!(
                        actor = %actor,
                        admin_id = %target,
                        error = %e,
                        "Token revocation failed, rolling back status change"
                    );
                })?;
        }

        tx.commit().await?;

        tracing::info!(actor = %actor, admin_id = %target, status = %status, "Admin status changed");
        Ok(())
    }

    /// Soft-delete a disabled admin together with its role links.
    ///
    /// # Errors
    ///
    /// Returns `AdminServiceError::UsernameNotRegistered` if the admin doesn't exist.
    /// Returns `AdminServiceError::DeleteOnlyDisabled` if the admin is still enabled.
    pub async fn delete_admin(
        &self,
        actor: AdminId,
        target: AdminId,
    ) -> Result<(), AdminServiceError> {
        let mut tx = self.store.begin().await?;

        let admin = tx
            .lock_by_id(target)
            .await?
            .ok_or(AdminServiceError::UsernameNotRegistered)?;

        if admin.status.is_enabled() {
            return Err(AdminServiceError::DeleteOnlyDisabled);
        }

        tx.update(target, &AdminChanges::soft_delete()).await?;
        let unlinked_roles = tx.update_roles_to_deleted_by_admin_id(target).await?;
        tx.commit().await?;

        tracing::info!(
            actor = %actor,
            admin_id = %target,
            unlinked_roles,
            "Admin deleted"
        );
        Ok(())
    }
}

// =============================================================================
// Input validation
// =============================================================================

fn parse_username(raw: &str) -> Result<Username, AdminServiceError> {
    Username::parse(raw).map_err(|e| AdminServiceError::Validation(e.to_string()))
}

fn parse_nickname(raw: &str) -> Result<String, AdminServiceError> {
    let nickname = raw.trim();
    if nickname.is_empty() {
        return Err(AdminServiceError::Validation(
            "nickname cannot be empty".to_owned(),
        ));
    }
    if nickname.chars().count() > MAX_NICKNAME_LENGTH {
        return Err(AdminServiceError::Validation(format!(
            "nickname must be at most {MAX_NICKNAME_LENGTH} characters"
        )));
    }
    Ok(nickname.to_owned())
}

fn validate_password(password: &str) -> Result<(), AdminServiceError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(AdminServiceError::Validation(format!(
            "password must be {MIN_PASSWORD_LENGTH}-{MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// A unique violation on write means another admin claimed the username first.
fn username_conflict(e: RepositoryError) -> AdminServiceError {
    match e {
        RepositoryError::Conflict(_) => AdminServiceError::UsernameExists,
        other => AdminServiceError::Repository(other),
    }
}
