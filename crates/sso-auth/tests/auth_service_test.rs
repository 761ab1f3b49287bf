//! Integration tests for the authentication service.

use std::error::Error as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sso_auth::config::AuthConfig;
use sso_auth::error::AuthErrorKind;
use sso_auth::service::AuthService;
use sso_auth::token::{self, TokenError, TokenIssuer};
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::app::{App, CreateApp};
use sso_core::models::user::User;
use sso_core::repository::{AppProvider, UserProvider, UserSaver};
use sso_db::{MemoryStore, SurrealAppRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

const APP_SECRET: &str = "portal-secret";

fn test_config() -> AuthConfig {
    AuthConfig {
        token_ttl_secs: 900,
        pepper: None,
    }
}

/// Memory store seeded with application 1.
async fn setup() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .create_app(CreateApp {
            id: 1,
            name: "portal".into(),
            secret: APP_SECRET.into(),
        })
        .await
        .unwrap();
    store
}

fn service(store: &MemoryStore) -> AuthService<MemoryStore, MemoryStore, MemoryStore> {
    AuthService::new(store.clone(), store.clone(), store.clone(), test_config())
}

#[tokio::test]
async fn register_then_login_end_to_end() {
    let store = setup().await;
    let svc = service(&store);

    let id = svc.register_new_user("a@x.com", "secret123").await.unwrap();
    assert_eq!(id, 1);

    let token = svc.login("a@x.com", "secret123", 1).await.unwrap();
    let claims = token::decode_token(&token, APP_SECRET).unwrap();
    assert_eq!(claims.uid, 1);
    assert_eq!(claims.app_id, 1);
    assert_eq!(claims.email, "a@x.com");
    assert!(claims.exp > chrono::Utc::now().timestamp());
    assert_eq!(claims.exp - claims.iat, 900);

    let err = svc.login("a@x.com", "wrong", 1).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);

    let err = svc.login("nouser@x.com", "x", 1).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);

    let err = svc.login("a@x.com", "secret123", 999).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::ApplicationLookupFailure);
}

#[tokio::test]
async fn stored_hash_is_not_the_plaintext() {
    let store = setup().await;
    let svc = service(&store);

    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    let user = store.user_by_email("a@x.com").await.unwrap();
    assert_ne!(user.password_hash, "secret123");
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let store = setup().await;
    let svc = service(&store);
    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    let wrong_password = svc.login("a@x.com", "nope", 1).await.unwrap_err();
    let unknown_email = svc.login("b@x.com", "nope", 1).await.unwrap_err();

    assert_eq!(wrong_password.kind(), unknown_email.kind());
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(wrong_password.source().is_none());
    assert!(unknown_email.source().is_none());
}

#[tokio::test]
async fn token_is_scoped_to_the_requested_application() {
    let store = setup().await;
    store
        .create_app(CreateApp {
            id: 2,
            name: "billing".into(),
            secret: "billing-secret".into(),
        })
        .await
        .unwrap();
    let svc = service(&store);
    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    let token = svc.login("a@x.com", "secret123", 2).await.unwrap();

    assert_eq!(token::decode_token(&token, "billing-secret").unwrap().app_id, 2);
    assert!(matches!(
        token::decode_token(&token, APP_SECRET),
        Err(TokenError::Invalid(_))
    ));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let store = setup().await;
    let svc = service(&store);

    svc.register_new_user("a@x.com", "first").await.unwrap();
    let err = svc.register_new_user("a@x.com", "second").await.unwrap_err();

    assert_eq!(err.kind(), AuthErrorKind::DuplicateUser);
    assert_eq!(err.op(), "auth.register_new_user");
    // The original credentials still work.
    svc.login("a@x.com", "first", 1).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_registration_has_one_winner() {
    let store = setup().await;
    let svc = Arc::new(service(&store));

    let a = tokio::spawn({
        let svc = svc.clone();
        async move { svc.register_new_user("race@x.com", "pw-a").await }
    });
    let b = tokio::spawn({
        let svc = svc.clone();
        async move { svc.register_new_user("race@x.com", "pw-b").await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1);
    let err = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(err.kind(), AuthErrorKind::DuplicateUser);
    assert_eq!(store.user_count().await, 1);
}

#[tokio::test]
async fn equal_passwords_get_different_hashes() {
    let store = setup().await;
    let svc = service(&store);

    svc.register_new_user("a@x.com", "same-password").await.unwrap();
    svc.register_new_user("b@x.com", "same-password").await.unwrap();

    let a = store.user_by_email("a@x.com").await.unwrap();
    let b = store.user_by_email("b@x.com").await.unwrap();
    assert_ne!(a.password_hash, b.password_hash);

    svc.login("a@x.com", "same-password", 1).await.unwrap();
    svc.login("b@x.com", "same-password", 1).await.unwrap();
}

#[tokio::test]
async fn pepper_must_match_between_register_and_login() {
    let store = setup().await;
    let peppered = AuthService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        AuthConfig {
            pepper: Some("pepper!".into()),
            ..test_config()
        },
    );
    peppered.register_new_user("a@x.com", "secret123").await.unwrap();
    peppered.login("a@x.com", "secret123", 1).await.unwrap();

    let plain = service(&store);
    let err = plain.login("a@x.com", "secret123", 1).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Saver whose backend is down.
struct BrokenSaver;

impl UserSaver for BrokenSaver {
    async fn save_user(&self, _email: &str, _password_hash: &str) -> SsoResult<i64> {
        Err(SsoError::Database(
            "driver: connection refused (db.internal:8000)".into(),
        ))
    }
}

/// Saver that never answers.
struct StalledSaver;

impl UserSaver for StalledSaver {
    async fn save_user(&self, _email: &str, _password_hash: &str) -> SsoResult<i64> {
        std::future::pending().await
    }
}

/// App provider that counts lookups.
#[derive(Clone, Default)]
struct CountingApps {
    calls: Arc<AtomicUsize>,
    inner: MemoryStore,
}

impl AppProvider for CountingApps {
    async fn app_by_id(&self, id: i64) -> SsoResult<App> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.app_by_id(id).await
    }
}

/// Issuer that always fails.
struct FailingIssuer;

impl TokenIssuer for FailingIssuer {
    fn issue(&self, _user: &User, _app: &App, _ttl: Duration) -> Result<String, TokenError> {
        Err(TokenError::InvalidKey("bad key material".into()))
    }
}

#[tokio::test]
async fn storage_errors_are_classified_without_leaking_cause() {
    let store = setup().await;
    let svc = AuthService::new(BrokenSaver, store.clone(), store.clone(), test_config());

    let err = svc.register_new_user("a@x.com", "secret123").await.unwrap_err();

    assert_eq!(err.kind(), AuthErrorKind::StorageFailure);
    assert!(!err.to_string().contains("db.internal"));
    let cause = err.source().expect("cause should be preserved");
    assert!(cause.to_string().contains("connection refused"));
}

#[tokio::test]
async fn application_is_not_looked_up_for_bad_credentials() {
    let store = setup().await;
    let apps = CountingApps {
        inner: store.clone(),
        ..Default::default()
    };
    let svc = AuthService::new(store.clone(), store.clone(), apps.clone(), test_config());
    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    svc.login("a@x.com", "wrong", 1).await.unwrap_err();
    svc.login("nouser@x.com", "x", 1).await.unwrap_err();
    assert_eq!(apps.calls.load(Ordering::SeqCst), 0);

    svc.login("a@x.com", "secret123", 1).await.unwrap();
    assert_eq!(apps.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn signing_failure_yields_no_token() {
    let store = setup().await;
    let svc = AuthService::with_issuer(
        store.clone(),
        store.clone(),
        store.clone(),
        FailingIssuer,
        test_config(),
    );
    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    let err = svc.login("a@x.com", "secret123", 1).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::SigningFailure);
}

#[tokio::test]
async fn empty_application_secret_is_a_signing_failure() {
    let store = setup().await;
    store
        .create_app(CreateApp {
            id: 5,
            name: "misconfigured".into(),
            secret: String::new(),
        })
        .await
        .unwrap();
    let svc = service(&store);
    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    let err = svc.login("a@x.com", "secret123", 5).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::SigningFailure);
}

#[tokio::test]
async fn caller_deadline_aborts_registration() {
    let store = setup().await;
    let svc = AuthService::new(StalledSaver, store.clone(), store.clone(), test_config());

    let result = tokio::time::timeout(
        Duration::from_millis(500),
        svc.register_new_user("a@x.com", "secret123"),
    )
    .await;

    assert!(result.is_err(), "registration should hit the deadline");
    assert_eq!(store.user_count().await, 0);
}

#[tokio::test]
async fn end_to_end_against_surrealdb() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sso_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let apps = SurrealAppRepository::new(db.clone());
    apps.create(CreateApp {
        id: 1,
        name: "portal".into(),
        secret: APP_SECRET.into(),
    })
    .await
    .unwrap();

    let svc = AuthService::new(users.clone(), users, apps, test_config());

    let id = svc.register_new_user("a@x.com", "secret123").await.unwrap();
    let token = svc.login("a@x.com", "secret123", 1).await.unwrap();
    let claims = token::decode_token(&token, APP_SECRET).unwrap();
    assert_eq!(claims.uid, id);
    assert_eq!(claims.app_id, 1);

    let err = svc.register_new_user("a@x.com", "again").await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::DuplicateUser);

    let err = svc.login("a@x.com", "secret123", 999).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::ApplicationLookupFailure);
}

#[tokio::test]
async fn unusable_stored_hash_reads_as_invalid_credentials() {
    let store = setup().await;
    store.save_user("a@x.com", "not-a-phc").await.unwrap();
    let svc = service(&store);

    let err = svc.login("a@x.com", "secret123", 1).await.unwrap_err();

    assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);
    assert!(err.source().is_none());
}

#[tokio::test]
async fn oversized_ttl_is_a_signing_failure() {
    let store = setup().await;
    let svc = AuthService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        AuthConfig {
            token_ttl_secs: i64::MAX as u64,
            ..test_config()
        },
    );
    svc.register_new_user("a@x.com", "secret123").await.unwrap();

    let err = svc.login("a@x.com", "secret123", 1).await.unwrap_err();
    assert_eq!(err.kind(), AuthErrorKind::SigningFailure);
}
