//! Integration tests for permission gating and navigation.

mod helpers;

use wastetrack_auth::{filter_navigation, has_permission};
use wastetrack_core::config::SessionConfig;
use wastetrack_core::error::ErrorKind;
use wastetrack_entity::navigation::{NavigationItem, default_navigation};
use wastetrack_entity::permission::{PermissionAction, module};
use wastetrack_entity::user::UserRole;

#[tokio::test]
async fn test_permission_rows_are_read_on_every_check() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    let session = app.signed_in().await;

    let resolved = session.current_user(false).await.unwrap().unwrap();
    assert!(resolved.profile().active);

    let err = session
        .authorize(PermissionAction::Read, module::USERS)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authorization));

    app.grant(UserRole::Supervisor, module::USERS, &[PermissionAction::Read]);

    session
        .authorize(PermissionAction::Read, module::USERS)
        .await
        .unwrap();
    assert!(!session.can(PermissionAction::Write, module::USERS).await.unwrap());
}

#[tokio::test]
async fn test_rows_of_other_roles_do_not_apply() {
    let app = helpers::TestApp::new(UserRole::Transporter).await;
    app.grant(UserRole::Admin, module::DELIVERIES, &[PermissionAction::Read]);
    let session = app.signed_in().await;

    assert!(!session.can(PermissionAction::Read, module::DELIVERIES).await.unwrap());
}

#[tokio::test]
async fn test_navigation_for_transporter() {
    let app = helpers::TestApp::new(UserRole::Transporter).await;
    app.grant(UserRole::Transporter, module::WASTE, &[PermissionAction::Read]);
    app.grant(UserRole::Transporter, module::DELIVERIES, &[PermissionAction::Read, PermissionAction::Write]);
    app.grant(UserRole::Transporter, module::USERS, &[PermissionAction::Read]);
    let session = app.signed_in().await;

    let titles: Vec<_> = session
        .navigation(default_navigation())
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();

    assert_eq!(titles, vec!["Panel", "Residuos", "Pesaje y entregas"]);
}

#[tokio::test]
async fn test_signed_out_sees_no_navigation() {
    let app = helpers::TestApp::new(UserRole::Admin).await;
    let session = app.session();
    assert!(session.navigation(default_navigation()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_bypass_shows_admin_menu_without_rows() {
    let app = helpers::TestApp::new(UserRole::Admin).await;
    app.signed_in().await;

    let strict = app.session();
    let titles: Vec<_> = strict
        .navigation(default_navigation())
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["Panel"]);

    let config = SessionConfig {
        admin_bypass: true,
        ..app.config.clone()
    };
    let bypass = app.session_with(&config);
    let visible = bypass.navigation(default_navigation()).await.unwrap();
    assert_eq!(visible.len(), default_navigation().len());
}

#[tokio::test]
async fn test_inactive_account_cannot_sign_in() {
    let app = helpers::TestApp::new(UserRole::Supervisor).await;
    app.profiles.update(app.account.id, |p| p.active = false);

    let session = app.session();
    let err = session
        .sign_in(&app.account.email, wastetrack_auth::testing::PASSWORD)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authentication));
    assert!(!app.mirror_exists("auth_session"));
}

#[test]
fn test_empty_permission_list_denies() {
    for m in module::ALL.iter().copied().chain(["", "desconocido"]) {
        for action in [
            PermissionAction::Read,
            PermissionAction::Write,
            PermissionAction::Delete,
        ] {
            assert!(!has_permission(&[], m, action));
        }
    }
}

#[test]
fn test_role_allow_list_gate() {
    let admin_only = [NavigationItem {
        title: "Usuarios",
        route: "/usuarios",
        icon: "users",
        allowed_roles: &[UserRole::Admin],
        module: None,
    }];
    let operations = [NavigationItem {
        title: "Pesaje y entregas",
        route: "/entregas",
        icon: "truck",
        allowed_roles: &[UserRole::Supervisor, UserRole::Transporter, UserRole::Admin],
        module: None,
    }];

    assert!(filter_navigation(&admin_only, UserRole::Transporter, &[]).is_empty());
    assert_eq!(filter_navigation(&operations, UserRole::Transporter, &[]).len(), 1);
}
