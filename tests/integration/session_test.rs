//! Integration tests for the session lifecycle over a shared on-disk mirror.

mod helpers;

use std::sync::atomic::Ordering;

use chrono::Duration;

use wastetrack_auth::{Freshness, SessionState};
use wastetrack_core::error::ErrorKind;
use wastetrack_core::traits::Clock;
use wastetrack_core::traits::storage::SessionStorage;
use wastetrack_entity::identity::AuthSession;
use wastetrack_entity::permission::{PermissionAction, module};
use wastetrack_entity::user::UserRole;

#[tokio::test]
async fn test_second_process_reuses_fresh_mirror() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    app.signed_in().await;
    assert!(app.mirror_exists("user_profile"));
    assert!(app.mirror_exists("auth_session"));

    app.clock.advance(Duration::minutes(4));
    let other = app.session();
    let resolved = other.current_user(false).await.unwrap().unwrap();

    assert_eq!(resolved.profile().id, app.account.id);
    assert_eq!(app.profiles.find_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_mirror_goes_back_to_backend() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    app.signed_in().await;

    app.clock.advance(Duration::seconds(300));
    let other = app.session();
    other.current_user(false).await.unwrap().unwrap();

    assert_eq!(app.profiles.find_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sign_out_clears_shared_mirror() {
    let app = helpers::TestApp::new(UserRole::Generator).await;
    let session = app.signed_in().await;

    session.sign_out().await.unwrap();
    assert!(!app.mirror_exists("user_profile"));
    assert!(!app.mirror_exists("auth_session"));
    assert_eq!(session.state(), SessionState::Anonymous);

    let other = app.session();
    assert!(other.current_user(false).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoked_identity_resolves_to_anonymous() {
    let app = helpers::TestApp::new(UserRole::Transporter).await;
    let session = app.signed_in().await;

    app.identity.revoke_all();
    app.clock.advance(Duration::minutes(6));
    assert!(matches!(
        session.state(),
        SessionState::Authenticated {
            freshness: Freshness::Stale,
            ..
        }
    ));

    assert!(session.current_user(false).await.unwrap().is_none());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!app.mirror_exists("user_profile"));
}

#[tokio::test]
async fn test_rejected_refresh_token_returns_to_anonymous() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    let session = app.signed_in().await;

    let key = &app.config.auth_key;
    let mut tokens: AuthSession = app.storage.get_json(key).await.unwrap().unwrap();
    tokens.expires_at = Some(app.clock.now().timestamp() - 1);
    app.storage.set_json(key, &tokens).await.unwrap();
    app.identity.revoke_all();
    app.clock.advance(Duration::minutes(6));

    assert!(session.current_user(false).await.unwrap().is_none());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!app.mirror_exists("auth_session"));
    assert!(!app.mirror_exists("user_profile"));
}

#[tokio::test]
async fn test_degraded_sign_in_is_read_only() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    app.grant(
        UserRole::Supervisor,
        module::INCIDENTS,
        &[PermissionAction::Read, PermissionAction::Write],
    );
    app.profiles.fail.store(true, Ordering::SeqCst);

    let session = app.signed_in().await;
    let resolved = session.current_user(false).await.unwrap().unwrap();
    assert!(resolved.is_degraded());
    assert_eq!(resolved.profile().role, UserRole::Supervisor);
    assert!(matches!(
        session.state(),
        SessionState::Authenticated { degraded: true, .. }
    ));

    session
        .authorize(PermissionAction::Read, module::INCIDENTS)
        .await
        .unwrap();
    let err = session
        .authorize(PermissionAction::Write, module::INCIDENTS)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authorization));
}

#[tokio::test]
async fn test_degraded_profile_recovers_after_expiry() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    app.profiles.fail.store(true, Ordering::SeqCst);
    let session = app.signed_in().await;

    app.profiles.fail.store(false, Ordering::SeqCst);
    app.clock.advance(Duration::minutes(5));

    let resolved = session.current_user(false).await.unwrap().unwrap();
    assert!(!resolved.is_degraded());
}

#[tokio::test]
async fn test_profile_update_conflict() {
    let app = helpers::TestApp::new(UserRole::Generator).await;
    app.grant(UserRole::Generator, module::USERS, &[PermissionAction::Write]);
    let first = app.signed_in().await;
    let second = app.session();
    let version = first.current_user(false).await.unwrap().unwrap().profile().version;

    let rename = wastetrack_entity::user::ProfileUpdate {
        full_name: Some("Marta Ibáñez Ruiz".into()),
        ..Default::default()
    };
    first.update_profile(app.account.id, &rename, version).await.unwrap();

    let promote = wastetrack_entity::user::ProfileUpdate {
        role: Some(UserRole::Supervisor),
        ..Default::default()
    };
    let err = second
        .update_profile(app.account.id, &promote, version)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Conflict));
    assert_eq!(app.profiles.get(app.account.id).unwrap().role, UserRole::Generator);
}
