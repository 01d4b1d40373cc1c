//! Integration tests for signup, login, logout, and session restore.
//!
//! Verification command: `cargo test --test auth_flow`

use std::sync::Arc;

use taskboard::StoreError;
use taskboard::auth::AuthStore;
use taskboard::config::Latency;
use taskboard::storage::MemoryStorage;

const PASSWORD: &str = "Corr3ct!horse";

fn new_store(storage: &Arc<MemoryStorage>) -> AuthStore {
    let store = AuthStore::new(storage.clone(), Latency::none());
    store.restore_session();
    store
}

#[tokio::test]
async fn full_account_lifecycle() {
    let storage = Arc::new(MemoryStorage::new());
    let auth = new_store(&storage);
    assert!(!auth.state().is_authenticated());

    let created = auth.signup("a@x.com", PASSWORD).await.unwrap();
    assert!(auth.state().is_authenticated());

    auth.logout().await;
    assert!(!auth.state().is_authenticated());

    let again = auth.login("a@x.com", PASSWORD).await.unwrap();
    assert_eq!(again, created);
}

#[tokio::test]
async fn email_uniqueness_ignores_case() {
    let storage = Arc::new(MemoryStorage::new());
    let auth = new_store(&storage);
    auth.signup("a@x.com", PASSWORD).await.unwrap();
    auth.logout().await;

    let err = auth.signup("A@X.com", PASSWORD).await.unwrap_err();
    assert_eq!(err.to_string(), "User with this email already exists");
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn wrong_password_is_rejected_generically() {
    let storage = Arc::new(MemoryStorage::new());
    let auth = new_store(&storage);
    auth.signup("a@x.com", PASSWORD).await.unwrap();
    auth.logout().await;

    let wrong = auth.login("a@x.com", "Wr0ng!pass").await.unwrap_err();
    let unknown = auth.login("b@x.com", PASSWORD).await.unwrap_err();
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert_eq!(
        auth.state().error.as_deref(),
        Some("Invalid email or password")
    );
}

#[tokio::test]
async fn session_survives_restart_until_logout() {
    let storage = Arc::new(MemoryStorage::new());
    let session = new_store(&storage)
        .signup("a@x.com", PASSWORD)
        .await
        .unwrap();

    let restarted = new_store(&storage);
    assert_eq!(restarted.state().session, Some(session));

    restarted.logout().await;
    assert!(new_store(&storage).state().session.is_none());
}

#[tokio::test]
async fn password_rules_report_first_failure() {
    let storage = Arc::new(MemoryStorage::new());
    let auth = new_store(&storage);

    let cases = [
        ("short", "Password must be at least 8 characters"),
        ("alllowercase1!", "Password must contain at least one uppercase letter"),
        ("NoDigits!!", "Password must contain at least one number"),
    ];
    for (password, expected) in cases {
        let err = auth.signup("a@x.com", password).await.unwrap_err();
        assert_eq!(err.to_string(), expected, "password {password:?}");
    }
}

#[tokio::test]
async fn error_clears_when_next_operation_starts() {
    let storage = Arc::new(MemoryStorage::new());
    let auth = new_store(&storage);
    auth.login("a@x.com", PASSWORD).await.unwrap_err();
    assert!(auth.state().error.is_some());

    auth.signup("a@x.com", PASSWORD).await.unwrap();
    assert!(auth.state().error.is_none());
}
