//! Integration tests for the user auth client.
//!
//! These tests run the client against a wiremock server and verify the
//! contracts that matter under concurrency and partial failure: the
//! single-flight refresh, the 401 → refresh → retry-once rule, and
//! logout's unconditional local clear. Call counts are asserted with
//! `.expect(n)` so a second backend hit fails the test, not just the
//! assertion at the end.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{auth_user_json, session_json, test_config, user_json, RecordingCookieSink};
use vantage_client::{AuthClient, RegisterOutcome};
use vantage_identity::{AuthError, CookieSink, Identity, Session};
use vantage_store::{CredentialStore, MemoryCredentialStore};

fn seeded_session(access: &str, refresh: &str) -> Session {
    Session::new(
        access,
        refresh,
        Utc::now() + chrono::Duration::hours(1),
        Identity::new(uuid::Uuid::now_v7(), "user@example.com"),
    )
}

struct Fixture {
    server: MockServer,
    store: Arc<MemoryCredentialStore>,
    cookies: Arc<RecordingCookieSink>,
    client: Arc<AuthClient>,
}

impl Fixture {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryCredentialStore::new());
        let cookies = RecordingCookieSink::new();
        let client = Arc::new(AuthClient::new(
            test_config(&server),
            store.clone(),
            cookies.clone(),
        ));
        Self {
            server,
            store,
            cookies,
            client,
        }
    }
}

// =============================================================================
// Login / register
// =============================================================================

#[tokio::test]
async fn test_login_stores_session_and_projects_cookie() {
    let fixture = Fixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(serde_json::json!({
            "email": "user@example.com"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_user_json("access-1", "refresh-1", "user@example.com")),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let session = fixture
        .client
        .login("user@example.com", "hunter2-long")
        .await
        .unwrap();

    assert_eq!(session.access_token, "access-1");
    assert_eq!(fixture.store.get().unwrap().access_token, "access-1");
    // The cookie projection must already be in place when login returns.
    assert_eq!(fixture.cookies.current().unwrap().value(), "access-1");
}

#[tokio::test]
async fn test_login_rejection_surfaces_invalid_credentials() {
    let fixture = Fixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": "Invalid credentials"
            })),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture.client.login("user@example.com", "wrong-password").await;

    assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    assert!(fixture.store.get().is_none());
    assert!(fixture.cookies.current().is_none());
}

#[tokio::test]
async fn test_register_success_signs_in() {
    let fixture = Fixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(auth_user_json("access-new", "refresh-new", "new@example.com")),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let outcome = fixture
        .client
        .register("new@example.com", "password123", Some("New User"))
        .await
        .unwrap();

    match outcome {
        RegisterOutcome::SignedIn(session) => assert_eq!(session.access_token, "access-new"),
        other => panic!("expected SignedIn, got {:?}", other),
    }
    assert!(fixture.store.get().is_some());
}

#[tokio::test]
async fn test_register_pending_confirmation_stores_nothing() {
    let fixture = Fixture::new().await;

    // Email confirmation pending: backend answers with an empty bundle.
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "user": user_json("018f4d9e-5b7a-7c3d-9e2f-1a2b3c4d5e6f", "new@example.com"),
            "session": {
                "access_token": "",
                "refresh_token": "",
                "token_type": "bearer",
                "expires_in": 0,
                "expires_at": 0
            }
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let outcome = fixture
        .client
        .register("new@example.com", "password123", None)
        .await
        .unwrap();

    assert!(matches!(outcome, RegisterOutcome::ConfirmationRequired(_)));
    assert!(fixture.store.get().is_none());
    assert!(fixture.cookies.current().is_none());
}

#[tokio::test]
async fn test_register_taken_email() {
    let fixture = Fixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "User already registered"
            })),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .client
        .register("taken@example.com", "password123", None)
        .await;

    assert_eq!(result.unwrap_err(), AuthError::EmailAlreadyRegistered);
}

#[tokio::test]
async fn test_register_rejects_short_password_client_side() {
    let fixture = Fixture::new().await;
    // No mock mounted: the request must never reach the wire.

    let result = fixture.client.register("new@example.com", "short", None).await;

    assert!(matches!(result, Err(AuthError::InvalidInput(_))));
}

// =============================================================================
// Single-flight refresh
// =============================================================================

#[tokio::test]
async fn test_concurrent_refreshes_issue_one_backend_call() {
    let fixture = Fixture::new().await;
    fixture.store.set(seeded_session("old-access", "old-refresh"));

    // The delay keeps the first redemption in flight while the other
    // callers pile up on the lock. expect(1) is the property under test.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_partial_json(serde_json::json!({
            "refresh_token": "old-refresh"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(session_json("new-access", "new-refresh"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = fixture.client.clone();
        handles.push(tokio::spawn(async move { client.refresh().await }));
    }

    for handle in handles {
        let session = handle.await.unwrap().unwrap();
        // Every caller gets the tokens from the single response.
        assert_eq!(session.access_token, "new-access");
        assert_eq!(session.refresh_token.as_deref(), Some("new-refresh"));
    }

    assert_eq!(fixture.cookies.current().unwrap().value(), "new-access");
}

#[tokio::test]
async fn test_rejected_refresh_clears_session() {
    let fixture = Fixture::new().await;
    fixture.store.set(seeded_session("old-access", "stale-refresh"));

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Invalid refresh token"
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture.client.refresh().await;

    assert_eq!(result.unwrap_err(), AuthError::RefreshTokenInvalid);
    assert!(fixture.store.get().is_none());
    assert!(fixture.cookies.current().is_none());
}

#[tokio::test]
async fn test_refresh_without_session_fails_fast() {
    let fixture = Fixture::new().await;

    let result = fixture.client.refresh().await;

    assert_eq!(result.unwrap_err(), AuthError::RefreshTokenInvalid);
}

// =============================================================================
// fetch_current_identity: 401 → refresh → retry once
// =============================================================================

#[tokio::test]
async fn test_unauthorized_identity_refreshes_and_retries_once() {
    let fixture = Fixture::new().await;
    fixture.store.set(seeded_session("expired-access", "live-refresh"));

    // First /auth/me with the stale token: 401.
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer expired-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(session_json("fresh-access", "fresh-refresh")),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    // Retry with the refreshed token succeeds.
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer fresh-access"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json("018f4d9e-5b7a-7c3d-9e2f-1a2b3c4d5e6f", "user@example.com")),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let identity = fixture.client.fetch_current_identity().await.unwrap();

    assert_eq!(identity.email, "user@example.com");
    assert_eq!(fixture.store.get().unwrap().access_token, "fresh-access");
}

#[tokio::test]
async fn test_second_unauthorized_after_refresh_is_terminal() {
    let fixture = Fixture::new().await;
    fixture.store.set(seeded_session("bad-access", "live-refresh"));

    // /auth/me rejects both the original and the refreshed token.
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&fixture.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(session_json("fresh-access", "fresh-refresh")),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture.client.fetch_current_identity().await;

    assert_eq!(result.unwrap_err(), AuthError::Unauthorized);
    // Terminal: session cleared, nothing left for the guard either.
    assert!(fixture.store.get().is_none());
    assert!(fixture.cookies.current().is_none());
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_everything_despite_backend_failure() {
    let fixture = Fixture::new().await;
    fixture.store.set(seeded_session("access", "refresh"));
    fixture.store.set_admin_session(vantage_identity::AdminSession::new(
        "admin-token",
        vantage_identity::AdminIdentity {
            id: uuid::Uuid::now_v7(),
            email: "admin@example.com".to_string(),
            last_login: None,
        },
        Utc::now(),
    ));

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&fixture.server)
        .await;

    fixture.client.logout().await;

    assert!(fixture.store.get().is_none());
    assert!(fixture.store.admin_session().is_none());
    assert!(fixture.store.impersonation().is_none());
    assert!(fixture.cookies.current().is_none());
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn test_password_reset_reports_success_for_unknown_email() {
    let fixture = Fixture::new().await;

    // Backend 404s for unknown emails; the caller must not learn that.
    Mock::given(method("POST"))
        .and(path("/auth/password/reset"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&fixture.server)
        .await;

    // No Result to inspect: the operation is infallible by contract.
    fixture.client.request_password_reset("nobody@example.com").await;
}

#[tokio::test]
async fn test_update_password_completes_reset_flow() {
    let fixture = Fixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/password/update"))
        .and(body_partial_json(serde_json::json!({
            "access_token": "reset-link-token"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Password updated"
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    fixture
        .client
        .update_password("reset-link-token", "new-password-1")
        .await
        .unwrap();

    // The reset flow never signs the user in.
    assert!(fixture.store.get().is_none());
}
