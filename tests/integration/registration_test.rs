//! Integration tests for identity registration and administration.

mod helpers;

use beautydesk_auth::{AuthError, RegistrationContext, validate_email, validate_password};
use beautydesk_database::CredentialStore;
use beautydesk_entity::identity::Role;
use helpers::{PASSWORD, TestApp, request};

#[tokio::test]
async fn test_register_returns_profile_without_password() {
    let app = TestApp::new();
    let identity = app
        .service
        .register(request("e1@x.com", "e1"), RegistrationContext::SelfService)
        .await
        .unwrap();

    assert_eq!(identity.email, "e1@x.com");
    assert!(identity.is_active);
    let json = serde_json::to_value(&identity).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());

    let stored = app
        .store
        .find_by_email_or_username("e1@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_duplicates_rejected_case_insensitively() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    let err = app
        .service
        .register(request("E1@X.com", "other"), RegistrationContext::SelfService)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity);

    let err = app
        .service
        .register(request("other@x.com", "E1"), RegistrationContext::SelfService)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity);
}

#[tokio::test]
async fn test_weak_password_reports_every_rule() {
    let app = TestApp::new();
    let mut req = request("e1@x.com", "e1");
    req.password = "abc".to_string();

    match app
        .service
        .register(req, RegistrationContext::SelfService)
        .await
        .unwrap_err()
    {
        AuthError::Validation(errors) => {
            assert_eq!(errors, validate_password("abc").errors);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(app.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_bootstrap_admin_only_once() {
    let app = TestApp::new();
    let owner = app.register("owner@x.com", "owner").await;
    let staff = app.register("e1@x.com", "e1").await;

    assert_eq!(owner.role, Role::Admin);
    assert_eq!(staff.role, Role::Employee);
}

#[tokio::test]
async fn test_bootstrap_can_be_disabled() {
    let app = TestApp::with_config(|c| c.registration.bootstrap_admin = false);
    let first = app.register("owner@x.com", "owner").await;
    assert_eq!(first.role, Role::Employee);

    let mut req = request("boss@x.com", "boss");
    req.role = Some(Role::Admin);
    let err = app
        .service
        .register(req, RegistrationContext::SelfService)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn test_admin_invites_manager() {
    let app = TestApp::new();
    app.register("owner@x.com", "owner").await;

    let mut req = request("m1@x.com", "m1");
    req.role = Some(Role::Manager);
    let manager = app
        .service
        .register(
            req,
            RegistrationContext::Invited {
                inviter_role: Role::Admin,
            },
        )
        .await
        .unwrap();
    assert_eq!(manager.role, Role::Manager);

    let invited = app
        .service
        .register(
            request("e1@x.com", "e1"),
            RegistrationContext::Invited {
                inviter_role: Role::Admin,
            },
        )
        .await
        .unwrap();
    assert_eq!(invited.role, Role::Employee);
}

#[tokio::test]
async fn test_reenabled_account_can_log_in() {
    let app = TestApp::new();
    app.register("e1@x.com", "e1").await;

    app.service.set_active("e1", false).await.unwrap();
    assert_eq!(
        app.service
            .login("e1", PASSWORD, false, None)
            .await
            .unwrap_err(),
        AuthError::AccountDisabled
    );

    let profile = app.service.set_active("E1@x.com", true).await.unwrap();
    assert!(profile.is_active);
    assert!(app.service.login("e1", PASSWORD, false, None).await.is_ok());
}

#[test]
fn test_standalone_validators() {
    assert!(validate_email("e1@x.com"));
    assert!(!validate_email("e1@"));

    let check = validate_password(PASSWORD);
    assert!(check.is_valid);
    assert!(check.errors.is_empty());

    let check = validate_password("password");
    assert!(!check.is_valid);
    assert_eq!(check.errors.len(), 3);
}
