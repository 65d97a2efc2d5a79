//! Integration tests for login throttling through the session service.

mod helpers;

use chrono::Duration;

use beautydesk_auth::AuthError;
use helpers::{PASSWORD, TestApp};

async fn fail(app: &TestApp, identifier: &str, times: usize) {
    for _ in 0..times {
        let err = app
            .service
            .login(identifier, "wrongpw", false, None)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }
}

#[tokio::test]
async fn test_sixth_attempt_is_rate_limited_even_with_correct_password() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    fail(&app, "e1@x.com", 5).await;

    let err = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap_err();
    match err {
        AuthError::RateLimited {
            remaining_minutes,
            remaining_ms,
        } => {
            assert_eq!(remaining_minutes, 15);
            assert_eq!(remaining_ms, 15 * 60 * 1000);
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blocked_login_skips_credential_lookup() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    let before = app.lookups();
    fail(&app, "e1@x.com", 5).await;
    let lookups = app.lookups();
    assert_eq!(lookups, before + 5);

    let err = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RateLimited { .. }));
    assert_eq!(app.lookups(), lookups);
}

#[tokio::test]
async fn test_lockout_lifts_after_window() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    fail(&app, "e1@x.com", 5).await;

    app.clock.advance(Duration::minutes(14) + Duration::seconds(30));
    match app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap_err()
    {
        AuthError::RateLimited {
            remaining_minutes, ..
        } => assert_eq!(remaining_minutes, 1),
        other => panic!("expected rate limit, got {other:?}"),
    }

    app.clock.advance(Duration::seconds(30));
    assert!(
        app.service
            .login("e1@x.com", PASSWORD, false, None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_unknown_identifiers_are_throttled_too() {
    let app = TestApp::new();
    fail(&app, "ghost@x.com", 5).await;

    let err = app
        .service
        .login("ghost@x.com", "anything", false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RateLimited { .. }));
}

#[tokio::test]
async fn test_lockout_is_per_identifier() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;
    app.register("e2@x.com", "e2").await;

    fail(&app, "e1@x.com", 5).await;

    assert!(
        app.service
            .login("e2@x.com", PASSWORD, false, None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_success_resets_failure_history() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    fail(&app, "e1@x.com", 4).await;
    app.service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap();

    // A fresh budget of failures after the reset.
    fail(&app, "e1@x.com", 4).await;
    assert!(
        app.service
            .login("e1@x.com", PASSWORD, false, None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_configured_threshold_is_respected() {
    let app = TestApp::with_config(|c| {
        c.rate_limit.max_login_attempts = 2;
        c.rate_limit.lockout_duration_minutes = 1;
    });
    app.register("e1@x.com", "e1").await;

    fail(&app, "e1@x.com", 2).await;
    let err = app
        .service
        .login("e1@x.com", PASSWORD, false, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::RateLimited {
            remaining_minutes: 1,
            ..
        }
    ));
}
