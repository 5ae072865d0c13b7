use profile_portal::{
    AppConfig, ClientContext, MockAuthBackend, SessionError,
    backend::BackendState,
    error::TRANSIENT_FAILURE,
    forms::{AuthForm, Field, FormMode, REQUIRED_MESSAGE},
    models::UserProfile,
    navigation::HistoryNavigator,
    storage::{KeyValueStorage, MemoryStorage},
};
use std::sync::Arc;

// --- Test Utilities ---

struct Harness {
    ctx: ClientContext,
    storage: MemoryStorage,
    navigator: HistoryNavigator,
}

fn harness(backend: MockAuthBackend) -> Harness {
    let storage = MemoryStorage::new();
    let navigator = HistoryNavigator::new();
    let ctx = ClientContext::assemble(
        &AppConfig::default(),
        Arc::new(storage.clone()),
        Arc::new(backend) as BackendState,
        Arc::new(navigator.clone()),
    );
    Harness {
        ctx,
        storage,
        navigator,
    }
}

fn bob() -> UserProfile {
    UserProfile {
        id: 2,
        email: "bob@example.com".to_string(),
        username: "bob".to_string(),
        active: true,
    }
}

// --- Login ---

#[tokio::test]
async fn test_login_writes_both_copies_and_lands() {
    let h = harness(MockAuthBackend::new().with_account(bob(), "hunter2", "tok-bob"));

    let mut form = AuthForm::login("bob", "hunter2");
    form.submit(&h.ctx.auth).await.unwrap();

    assert_eq!(h.ctx.store.client_token().await.unwrap().as_deref(), Some("tok-bob"));
    assert_eq!(h.ctx.store.cookie_token().await.unwrap().as_deref(), Some("tok-bob"));
    assert_eq!(h.navigator.current().as_deref(), Some("/"));
    assert!(form.error().is_none());
}

#[tokio::test]
async fn test_login_sets_lax_root_cookie() {
    let h = harness(MockAuthBackend::new().with_account(bob(), "hunter2", "tok-bob"));

    AuthForm::login("bob", "hunter2")
        .submit(&h.ctx.auth)
        .await
        .unwrap();

    let set_cookie = h.ctx.cookie.last_set_cookie().unwrap();
    assert!(set_cookie.starts_with("token=tok-bob"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn test_wrong_password_shows_backend_message() {
    let h = harness(MockAuthBackend::new().with_account(bob(), "hunter2", "tok-bob"));

    let mut form = AuthForm::login("bob", "wrong");
    let err = form.submit(&h.ctx.auth).await.unwrap_err();

    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(form.error(), Some("Incorrect username or password"));
    assert_eq!(h.storage.get_item("token").await.unwrap(), None);
    assert!(h.navigator.history().is_empty());
}

#[tokio::test]
async fn test_error_is_cleared_on_resubmit() {
    let h = harness(MockAuthBackend::new().with_account(bob(), "hunter2", "tok-bob"));

    let mut form = AuthForm::login("bob", "wrong");
    assert!(form.submit(&h.ctx.auth).await.is_err());
    assert!(form.error().is_some());

    form.password = "hunter2".to_string();
    form.submit(&h.ctx.auth).await.unwrap();

    assert!(form.error().is_none());
}

#[tokio::test]
async fn test_offline_backend_shows_generic_message() {
    let h = harness(MockAuthBackend::new_offline());

    let mut form = AuthForm::login("bob", "hunter2");
    let err = form.submit(&h.ctx.auth).await.unwrap_err();

    assert!(matches!(err, SessionError::Transient(_)));
    assert_eq!(form.error(), Some(TRANSIENT_FAILURE));
}

// --- Required fields ---

#[tokio::test]
async fn test_missing_fields_never_reach_backend() {
    // Offline backend: any call that got through would surface as a transient error.
    let h = harness(MockAuthBackend::new_offline());

    let mut form = AuthForm::new(FormMode::Login);
    form.username = "bob".to_string();
    let err = form.submit(&h.ctx.auth).await.unwrap_err();

    assert_eq!(err, SessionError::Validation(REQUIRED_MESSAGE.to_string()));
    assert_eq!(form.field_errors().len(), 1);
    assert_eq!(form.field_errors()[0].field, Field::Password);
    assert!(form.error().is_none());
    assert!(h.navigator.history().is_empty());
}

#[tokio::test]
async fn test_register_requires_email() {
    let h = harness(MockAuthBackend::new_offline());

    let mut form = AuthForm::register("", "bob", "hunter2");
    assert!(form.submit(&h.ctx.auth).await.is_err());

    assert_eq!(form.field_errors()[0].field, Field::Email);
}

// --- Register ---

#[tokio::test]
async fn test_register_goes_to_login_without_token() {
    let h = harness(MockAuthBackend::new());

    let mut form = AuthForm::register("a@b.com", "a", "x");
    form.submit(&h.ctx.auth).await.unwrap();

    assert_eq!(h.navigator.current().as_deref(), Some("/login"));
    assert_eq!(h.ctx.store.client_token().await.unwrap(), None);
    assert_eq!(h.ctx.store.cookie_token().await.unwrap(), None);
}

#[tokio::test]
async fn test_registered_account_can_sign_in() {
    let h = harness(MockAuthBackend::new());

    AuthForm::register("a@b.com", "a", "x")
        .submit(&h.ctx.auth)
        .await
        .unwrap();
    AuthForm::login("a", "x").submit(&h.ctx.auth).await.unwrap();

    let state = h.ctx.session.mount().await;
    assert_eq!(state.user.map(|u| u.email), Some("a@b.com".to_string()));
}

#[tokio::test]
async fn test_duplicate_registration_shows_backend_message() {
    let h = harness(MockAuthBackend::new().with_account(bob(), "hunter2", "tok-bob"));

    let mut form = AuthForm::register("other@example.com", "bob", "pw");
    assert!(form.submit(&h.ctx.auth).await.is_err());

    assert_eq!(form.error(), Some("Username already registered"));
    assert!(h.navigator.history().is_empty());
}
