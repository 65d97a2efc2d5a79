//! Integration tests for login, session verification, refresh, and logout.

mod helpers;

use std::sync::Arc;

use chrono::Duration;

use beautydesk_auth::{AuthError, AuthSessionService, SessionState};
use beautydesk_core::config::AppConfig;
use beautydesk_core::error::ErrorKind;
use beautydesk_core::traits::ManualClock;
use beautydesk_database::MemoryCredentialStore;
use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_login_then_verify_session() {
    let app = TestApp::new();
    let identity = app.register("e1@x.com", "e1").await;

    let result = app
        .service
        .login("e1@x.com", PASSWORD, false, Some("10.0.0.7"))
        .await
        .unwrap();
    assert_eq!(result.identity.id, identity.id);
    assert!(!result.csrf_token.is_empty());
    assert_eq!(result.expires_at, app.now() + Duration::minutes(30));

    let verification = app.service.verify_session(&result.access_token).await;
    assert!(verification.is_valid);
    assert_eq!(verification.identity.map(|i| i.id), Some(identity.id));
}

#[tokio::test]
async fn test_login_by_username_any_case() {
    let app = TestApp::new();
    let identity = app.register("e1@x.com", "Stylist.Ana").await;

    let result = app
        .service
        .login("  stylist.ana ", PASSWORD, false, None)
        .await
        .unwrap();
    assert_eq!(result.identity.id, identity.id);

    let result = app
        .service
        .login("E1@X.COM", PASSWORD, false, None)
        .await
        .unwrap();
    assert_eq!(result.identity.id, identity.id);
}

#[tokio::test]
async fn test_result_never_contains_password_hash() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    let result = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["identity"].get("password_hash").is_none());
    assert!(!json.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_unknown_identity_and_wrong_password_look_identical() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    let unknown = app
        .service
        .login("nonexistent@x.com", "anything", false, None)
        .await
        .unwrap_err();
    let wrong = app
        .service
        .login("e1@x.com", "wrongpw", false, None)
        .await
        .unwrap_err();

    assert_eq!(unknown, AuthError::InvalidCredentials);
    assert_eq!(wrong, AuthError::InvalidCredentials);
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn test_deactivation_revokes_live_token() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    let result = app
        .service
        .login("e1@x.com", PASSWORD, true, None)
        .await
        .unwrap();
    assert!(app.service.verify_session(&result.access_token).await.is_valid);

    app.service.set_active("e1@x.com", false).await.unwrap();

    let verification = app.service.verify_session(&result.access_token).await;
    assert!(!verification.is_valid);
    assert!(verification.identity.is_none());

    let err = app
        .service
        .refresh(&result.refresh_token)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::AccountDisabled);
}

#[tokio::test]
async fn test_remember_me_extends_access_lifetime() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    let short = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();
    let long = app
        .service
        .login("e1@x.com", PASSWORD, true, None)
        .await
        .unwrap();

    assert!(long.remember_me);
    assert_eq!(long.expires_at - short.expires_at, Duration::days(30) - Duration::minutes(30));
    assert!(long.refresh_expires_at >= long.expires_at);

    app.clock.advance(Duration::days(1));
    assert!(!app.service.verify_session(&short.access_token).await.is_valid);
    assert!(app.service.verify_session(&long.access_token).await.is_valid);
}

#[tokio::test]
async fn test_token_rejected_exactly_at_expiry() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    let result = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(30) - Duration::seconds(1));
    assert!(app.service.verify_session(&result.access_token).await.is_valid);

    app.clock.advance(Duration::seconds(1));
    assert!(!app.service.verify_session(&result.access_token).await.is_valid);
    assert_eq!(app.service.state().await, SessionState::Expired);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_reuse() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    let login = app
        .service
        .login("e1@x.com", PASSWORD, true, None)
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(5));
    let refreshed = app.service.refresh(&login.refresh_token).await.unwrap();
    assert!(!refreshed.remember_me);
    assert_eq!(
        refreshed.expires_at,
        login.expires_at - Duration::days(30) + Duration::minutes(35)
    );
    assert_ne!(refreshed.refresh_token, login.refresh_token);
    assert!(app.service.verify_session(&refreshed.access_token).await.is_valid);

    let reused = app.service.refresh(&login.refresh_token).await.unwrap_err();
    assert_eq!(reused, AuthError::InvalidToken);

    assert!(app.service.refresh(&refreshed.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rejects_access_token_and_garbage() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    let login = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();

    assert_eq!(
        app.service.refresh(&login.access_token).await.unwrap_err(),
        AuthError::InvalidToken
    );
    assert_eq!(
        app.service.refresh("garbage").await.unwrap_err(),
        AuthError::InvalidToken
    );
}

#[tokio::test]
async fn test_logout_twice_rotates_csrf_each_time() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    let login = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();
    assert!(app.service.validate_csrf_token(&login.csrf_token).await);

    let first = app.service.logout(Some(&login.refresh_token)).await;
    let second = app.service.logout(None).await;

    assert_ne!(first, login.csrf_token);
    assert_ne!(first, second);
    assert!(!app.service.validate_csrf_token(&first).await);
    assert!(app.service.validate_csrf_token(&second).await);
    assert_eq!(app.service.state().await, SessionState::LoggedOut);
    assert!(app.service.current_identity().await.is_none());

    let err = app
        .service
        .refresh(&login.refresh_token)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidToken);
}

#[tokio::test]
async fn test_logout_with_garbage_token_still_succeeds() {
    let app = TestApp::new();
    let before = app.service.csrf_token().await;
    let after = app.service.logout(Some("not-a-token")).await;
    assert_ne!(before, after);
}

#[tokio::test]
async fn test_login_stamps_last_login() {
    let app = TestApp::new();
    let identity = app.register("e1@x.com", "e1").await;
    assert!(identity.last_login_at.is_none());

    let result = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();
    assert_eq!(result.identity.last_login_at, Some(app.now()));
}

#[test]
fn test_out_of_range_lifetime_is_a_configuration_error() {
    let mut config = AppConfig::default();
    config.auth.remember_me_duration_days = i64::MAX / 2;

    let err = AuthSessionService::new(
        &config,
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(ManualClock::starting_now()),
    )
    .err()
    .unwrap();
    assert_eq!(err.kind, ErrorKind::Configuration);
}
