//! Integration tests for the `PostgreSQL` admin store.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable via `ADMIN_DATABASE_URL`
//!   (or `DATABASE_URL`)
//!
//! Migrations are applied on connect. Every test uses freshly generated
//! usernames and nicknames, so runs do not interfere with each other.
//!
//! Run with: cargo test -p mall-integration-tests -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use sqlx::PgPool;

use mall_admin::{AdminService, AdminServiceError};
use mall_admin::config::AdminConfig;
use mall_admin::db::{self, PgAdminStore, PgAdminTransaction, PgTokenRevoker};
use mall_admin::models::{AdminAdd, AdminPageQuery, AdminUpdate, AdminView};
use mall_admin::store::{RevocationError, TokenRevoker};
use mall_core::{AdminId, AdminStatus};

const ACTOR: AdminId = AdminId::new(0);

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Connect and apply migrations.
async fn pool() -> PgPool {
    let config = AdminConfig::from_env().expect("ADMIN_DATABASE_URL must be set");
    let pool = db::create_pool(&config)
        .await
        .expect("Failed to connect to PostgreSQL");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Alphanumeric token unique within and across test runs. Always 13 characters.
fn unique(prefix: char) -> String {
    let micros = Utc::now().timestamp_micros() & 0xf_ffff_ffff;
    let seq = SEQUENCE.fetch_add(1, Ordering::SeqCst) % 1000;
    format!("{prefix}{micros:09x}{seq:03}")
}

fn pg_service<R>(pool: &PgPool, revoker: R) -> AdminService<PgAdminStore, R> {
    AdminService::new(PgAdminStore::new(pool.clone()), revoker)
}

async fn add_admin<R>(service: &AdminService<PgAdminStore, R>, nickname: &str) -> AdminView
where
    R: TokenRevoker<PgAdminTransaction>,
{
    service
        .add_admin(
            ACTOR,
            AdminAdd {
                username: unique('u'),
                nickname: nickname.to_owned(),
                password: SecretString::from("buzhidao".to_owned()),
            },
        )
        .await
        .expect("Failed to add admin")
}

async fn seed_tokens(pool: &PgPool, admin_id: AdminId) {
    let refresh_id = unique('r');
    sqlx::query(
        r"
        INSERT INTO admin.oauth2_refresh_token (id, admin_id, expires_at)
        VALUES ($1, $2, NOW() + INTERVAL '1 day')
        ",
    )
    .bind(&refresh_id)
    .bind(admin_id)
    .execute(pool)
    .await
    .expect("Failed to insert refresh token");

    sqlx::query(
        r"
        INSERT INTO admin.oauth2_access_token (id, refresh_token_id, admin_id, expires_at)
        VALUES ($1, $2, $3, NOW() + INTERVAL '1 hour')
        ",
    )
    .bind(unique('a'))
    .bind(&refresh_id)
    .bind(admin_id)
    .execute(pool)
    .await
    .expect("Failed to insert access token");
}

async fn valid_token_count(pool: &PgPool, admin_id: AdminId) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r"
        SELECT (SELECT COUNT(*) FROM admin.oauth2_access_token WHERE admin_id = $1 AND valid)
             + (SELECT COUNT(*) FROM admin.oauth2_refresh_token WHERE admin_id = $1 AND valid)
        ",
    )
    .bind(admin_id)
    .fetch_one(pool)
    .await
    .expect("Failed to count tokens")
}

async fn stored_status(pool: &PgPool, admin_id: AdminId) -> i16 {
    sqlx::query_scalar::<_, i16>("SELECT status FROM admin.admin WHERE id = $1")
        .bind(admin_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read status")
}

/// Invalidates tokens on the transaction, then reports the token service as down.
struct UnreachableTokenService;

#[async_trait]
impl TokenRevoker<PgAdminTransaction> for UnreachableTokenService {
    async fn remove_tokens(
        &self,
        tx: &mut PgAdminTransaction,
        admin_id: AdminId,
    ) -> Result<(), RevocationError> {
        PgTokenRevoker.remove_tokens(tx, admin_id).await?;
        Err(RevocationError::Unavailable(
            "token service offline".to_owned(),
        ))
    }
}

// ============================================================================
// Status & Token Revocation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_disable_invalidates_tokens() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let admin = add_admin(&service, "Han Meimei").await;
    seed_tokens(&pool, admin.id).await;
    assert_eq!(valid_token_count(&pool, admin.id).await, 2);

    service
        .update_admin_status(ACTOR, admin.id, 2)
        .await
        .expect("disable admin");

    assert_eq!(stored_status(&pool, admin.id).await, AdminStatus::Disabled.code());
    assert_eq!(valid_token_count(&pool, admin.id).await, 0);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_failed_revocation_rolls_back_status_and_tokens() {
    let pool = pool().await;
    let service = pg_service(&pool, UnreachableTokenService);
    let admin = add_admin(&service, "Han Meimei").await;
    seed_tokens(&pool, admin.id).await;

    let result = service.update_admin_status(ACTOR, admin.id, 2).await;

    assert!(matches!(result, Err(AdminServiceError::Revocation(_))));
    assert_eq!(stored_status(&pool, admin.id).await, AdminStatus::Enabled.code());
    assert_eq!(valid_token_count(&pool, admin.id).await, 2);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_concurrent_disables_are_serialized() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let admin = add_admin(&service, "Han Meimei").await;

    let (a, b) = tokio::join!(
        service.update_admin_status(ACTOR, admin.id, 2),
        service.update_admin_status(ACTOR, admin.id, 2),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AdminServiceError::StatusEquals)))
    );
}

// ============================================================================
// Create & Update
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_concurrent_duplicate_add_is_username_exists() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let username = unique('u');
    let input = || AdminAdd {
        username: username.clone(),
        nickname: "Alice".to_owned(),
        password: SecretString::from("buzhidao".to_owned()),
    };

    let (a, b) = tokio::join!(
        service.add_admin(ACTOR, input()),
        service.add_admin(ACTOR, input()),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AdminServiceError::UsernameExists)))
    );
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_update_leaves_status_untouched() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let admin = add_admin(&service, "Han Meimei").await;
    service
        .update_admin_status(ACTOR, admin.id, 2)
        .await
        .expect("disable admin");

    let renamed = unique('n');
    service
        .update_admin(
            ACTOR,
            AdminUpdate {
                id: admin.id,
                username: renamed.clone(),
                nickname: "Meimei".to_owned(),
            },
        )
        .await
        .expect("update admin");

    let (username, nickname, status) = sqlx::query_as::<_, (String, String, i16)>(
        "SELECT username, nickname, status FROM admin.admin WHERE id = $1",
    )
    .bind(admin.id)
    .fetch_one(&pool)
    .await
    .expect("Failed to read admin");

    assert_eq!(username, renamed);
    assert_eq!(nickname, "Meimei");
    assert_eq!(status, AdminStatus::Disabled.code());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_update_to_taken_username_is_username_exists() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let admin = add_admin(&service, "Han Meimei").await;
    let other = add_admin(&service, "Li Lei").await;

    let result = service
        .update_admin(
            ACTOR,
            AdminUpdate {
                id: admin.id,
                username: other.username.as_str().to_owned(),
                nickname: "Meimei".to_owned(),
            },
        )
        .await;

    assert!(matches!(result, Err(AdminServiceError::UsernameExists)));
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_nickname_filter_matches_wildcards_literally() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let tag = unique('k');

    let percent = add_admin(&service, &format!("{tag} 50%")).await;
    add_admin(&service, &format!("{tag} 500")).await;
    let underscore = add_admin(&service, &format!("{tag}_a")).await;
    add_admin(&service, &format!("{tag}xa")).await;
    let backslash = add_admin(&service, &format!("{tag}\\b")).await;
    add_admin(&service, &format!("{tag}xb")).await;

    let cases = [
        (format!("{tag} 50%"), percent.id),
        (format!("{tag}_"), underscore.id),
        (format!("{tag}\\"), backslash.id),
    ];

    for (filter, expected) in cases {
        let page = service
            .get_admin_page(&AdminPageQuery {
                nickname: Some(filter.clone()),
                page_no: 0,
                page_size: 10,
            })
            .await
            .expect("page");

        assert_eq!(page.count, 1, "filter {filter:?}");
        assert_eq!(page.admins.len(), 1, "filter {filter:?}");
        assert_eq!(page.admins[0].id, expected, "filter {filter:?}");
    }

    let all = service
        .get_admin_page(&AdminPageQuery {
            nickname: Some(tag),
            page_no: 0,
            page_size: 4,
        })
        .await
        .expect("page");
    assert_eq!(all.count, 6);
    assert_eq!(all.admins.len(), 4);
    assert!(all.admins.windows(2).all(|w| w[0].id < w[1].id));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL (ADMIN_DATABASE_URL)"]
async fn test_delete_cascades_roles_and_frees_username() {
    let pool = pool().await;
    let service = pg_service(&pool, PgTokenRevoker);
    let admin = add_admin(&service, "Han Meimei").await;

    for role_id in [1, 2] {
        sqlx::query("INSERT INTO admin.admin_role (admin_id, role_id) VALUES ($1, $2)")
            .bind(admin.id)
            .bind(role_id)
            .execute(&pool)
            .await
            .expect("Failed to insert role link");
    }
    assert_eq!(service.get_admin_roles(admin.id).await.expect("roles").len(), 2);

    let rejected = service.delete_admin(ACTOR, admin.id).await;
    assert!(matches!(
        rejected,
        Err(AdminServiceError::DeleteOnlyDisabled)
    ));

    service
        .update_admin_status(ACTOR, admin.id, 2)
        .await
        .expect("disable admin");
    service
        .delete_admin(ACTOR, admin.id)
        .await
        .expect("delete admin");

    let live_links = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM admin.admin_role WHERE admin_id = $1 AND NOT deleted",
    )
    .bind(admin.id)
    .fetch_one(&pool)
    .await
    .expect("Failed to count role links");
    assert_eq!(live_links, 0);
    assert!(service.get_admin_roles(admin.id).await.expect("roles").is_empty());

    let reused = service
        .add_admin(
            ACTOR,
            AdminAdd {
                username: admin.username.as_str().to_owned(),
                nickname: "New Operator".to_owned(),
                password: SecretString::from("password".to_owned()),
            },
        )
        .await
        .expect("reuse username");
    assert_ne!(reused.id, admin.id);
}
