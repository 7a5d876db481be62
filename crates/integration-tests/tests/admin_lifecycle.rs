//! Integration tests for creating and updating admin accounts.

use mall_admin::AdminServiceError;
use mall_admin::models::{AdminAdd, AdminUpdate};
use mall_admin::services::verify_password;
use mall_core::{AdminId, AdminStatus};
use mall_integration_tests::{MemoryRevoker, MemoryStore, service};
use secrecy::SecretString;

const ACTOR: AdminId = AdminId::new(1);

fn add(username: &str, nickname: &str, password: &str) -> AdminAdd {
    AdminAdd {
        username: username.to_owned(),
        nickname: nickname.to_owned(),
        password: SecretString::from(password.to_owned()),
    }
}

// =============================================================================
// add_admin
// =============================================================================

#[tokio::test]
async fn test_add_admin_creates_enabled_account() {
    let store = MemoryStore::new();
    let service = service(&store, &MemoryRevoker::new());

    let view = service
        .add_admin(ACTOR, add("operator", "Han Meimei", "buzhidao"))
        .await
        .expect("add admin");

    assert_eq!(view.username.as_str(), "operator");
    assert_eq!(view.nickname, "Han Meimei");
    assert_eq!(view.status, AdminStatus::Enabled);
    assert!(!view.deleted);

    let stored = store.admin(view.id).expect("stored row");
    assert_ne!(stored.password.as_str(), "buzhidao");
    assert!(verify_password("buzhidao", &stored.password));
}

#[tokio::test]
async fn test_added_admin_can_sign_in() {
    let store = MemoryStore::new();
    let service = service(&store, &MemoryRevoker::new());

    let view = service
        .add_admin(ACTOR, add("operator", "Han Meimei", "buzhidao"))
        .await
        .expect("add admin");

    let admin = service
        .validate_admin("operator", &SecretString::from("buzhidao".to_owned()))
        .await
        .expect("sign in");
    assert_eq!(admin.id, view.id);
}

#[tokio::test]
async fn test_add_admin_duplicate_username() {
    let store = MemoryStore::new();
    store.seed_admin("operator", "Han Meimei", "buzhidao", AdminStatus::Enabled);
    let service = service(&store, &MemoryRevoker::new());

    let result = service
        .add_admin(ACTOR, add("operator", "Someone Else", "password"))
        .await;

    assert!(matches!(result, Err(AdminServiceError::UsernameExists)));
    assert_eq!(store.snapshot().admins.len(), 1);
}

#[tokio::test]
async fn test_add_admin_rejects_malformed_input() {
    let store = MemoryStore::new();
    let service = service(&store, &MemoryRevoker::new());

    let cases = [
        add("op", "Han Meimei", "buzhidao"),
        add("operator!", "Han Meimei", "buzhidao"),
        add("operator", "   ", "buzhidao"),
        add("operator", "Han Meimei", "abc"),
        add("operator", "Han Meimei", "a-very-long-password"),
    ];

    for input in cases {
        let result = service.add_admin(ACTOR, input).await;
        assert!(matches!(result, Err(AdminServiceError::Validation(_))));
    }
    assert_eq!(store.write_attempts(), 0);
}

// =============================================================================
// update_admin
// =============================================================================

#[tokio::test]
async fn test_update_admin_changes_username_and_nickname() {
    let store = MemoryStore::new();
    let id = store.seed_admin("operator", "Han Meimei", "buzhidao", AdminStatus::Enabled);
    let service = service(&store, &MemoryRevoker::new());

    service
        .update_admin(
            ACTOR,
            AdminUpdate {
                id,
                username: "operator2".to_owned(),
                nickname: "Meimei".to_owned(),
            },
        )
        .await
        .expect("update admin");

    let stored = store.admin(id).expect("stored row");
    assert_eq!(stored.username.as_str(), "operator2");
    assert_eq!(stored.nickname, "Meimei");
    assert_eq!(stored.status, AdminStatus::Enabled);
}

#[tokio::test]
async fn test_update_admin_keeping_own_username() {
    let store = MemoryStore::new();
    let id = store.seed_admin("operator", "Han Meimei", "buzhidao", AdminStatus::Enabled);
    let service = service(&store, &MemoryRevoker::new());

    service
        .update_admin(
            ACTOR,
            AdminUpdate {
                id,
                username: "operator".to_owned(),
                nickname: "Meimei".to_owned(),
            },
        )
        .await
        .expect("update admin");

    assert_eq!(store.admin(id).expect("stored row").nickname, "Meimei");
}

#[tokio::test]
async fn test_update_admin_username_taken_by_other() {
    let store = MemoryStore::new();
    let id = store.seed_admin("operator", "Han Meimei", "buzhidao", AdminStatus::Enabled);
    store.seed_admin("auditor", "Li Lei", "buzhidao", AdminStatus::Enabled);
    let service = service(&store, &MemoryRevoker::new());

    let result = service
        .update_admin(
            ACTOR,
            AdminUpdate {
                id,
                username: "auditor".to_owned(),
                nickname: "Meimei".to_owned(),
            },
        )
        .await;

    assert!(matches!(result, Err(AdminServiceError::UsernameExists)));
    let stored = store.admin(id).expect("stored row");
    assert_eq!(stored.username.as_str(), "operator");
    assert_eq!(stored.nickname, "Han Meimei");
}

#[tokio::test]
async fn test_update_unknown_admin() {
    let store = MemoryStore::new();
    let service = service(&store, &MemoryRevoker::new());

    let result = service
        .update_admin(
            ACTOR,
            AdminUpdate {
                id: AdminId::new(404),
                username: "operator".to_owned(),
                nickname: "Meimei".to_owned(),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(AdminServiceError::UsernameNotRegistered)
    ));
}
