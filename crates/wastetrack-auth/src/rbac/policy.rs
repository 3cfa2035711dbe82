//! The single access policy every caller goes through.

use serde::Serialize;

use wastetrack_core::config::SessionConfig;
use wastetrack_core::error::AppError;
use wastetrack_core::result::AppResult;
use wastetrack_entity::navigation::NavigationItem;
use wastetrack_entity::permission::{PermissionAction, RolePermission};

use super::navigation;
use crate::profile::ResolvedProfile;

/// Whether `permissions` grant `action` on `module`.
///
/// Module names match exactly. No row means no access.
pub fn has_permission(
    permissions: &[RolePermission],
    module: &str,
    action: PermissionAction,
) -> bool {
    permissions
        .iter()
        .find(|row| row.module == module)
        .is_some_and(|row| row.allows(action))
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    /// The action may proceed.
    Allowed,
    /// The action is refused.
    Denied(String),
}

impl Decision {
    /// Whether the decision is [`Decision::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Client-side access policy.
///
/// Rules, first match wins: no user, inactive user, mutation by a degraded
/// profile (unless allowed), admin bypass (if enabled), then the
/// permission rows. These checks only shape the UI; the backend enforces
/// its own row-level rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    allow_degraded_writes: bool,
    admin_bypass: bool,
}

impl AccessPolicy {
    /// Build the policy from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            allow_degraded_writes: config.allow_degraded_writes,
            admin_bypass: config.admin_bypass,
        }
    }

    /// Evaluate `action` on `module` for `user` holding `permissions`.
    pub fn check(
        &self,
        user: Option<&ResolvedProfile>,
        permissions: &[RolePermission],
        action: PermissionAction,
        module: &str,
    ) -> Decision {
        let Some(user) = user else {
            return Decision::Denied("not signed in".into());
        };
        let profile = user.profile();

        if !profile.active {
            return Decision::Denied("account is inactive".into());
        }
        if user.is_degraded() && action.is_mutation() && !self.allow_degraded_writes {
            return Decision::Denied(format!(
                "profile could not be verified; {action} on '{module}' is disabled"
            ));
        }
        if self.admin_bypass && profile.is_admin() {
            return Decision::Allowed;
        }
        if has_permission(permissions, module, action) {
            Decision::Allowed
        } else {
            Decision::Denied(format!("role '{}' lacks {action} on '{module}'", profile.role))
        }
    }

    /// Boolean form of [`Self::check`].
    pub fn can(
        &self,
        user: Option<&ResolvedProfile>,
        permissions: &[RolePermission],
        action: PermissionAction,
        module: &str,
    ) -> bool {
        self.check(user, permissions, action, module).is_allowed()
    }

    /// Like [`Self::check`], but a denial becomes an `Authorization` error.
    pub fn require(
        &self,
        user: Option<&ResolvedProfile>,
        permissions: &[RolePermission],
        action: PermissionAction,
        module: &str,
    ) -> AppResult<()> {
        match self.check(user, permissions, action, module) {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(AppError::authorization(reason)),
        }
    }

    /// Whether a navigation entry is visible to `user`.
    ///
    /// The role must be on the entry's allow-list and, if the entry names a
    /// module, the user must be able to read it.
    pub fn can_view(
        &self,
        user: Option<&ResolvedProfile>,
        permissions: &[RolePermission],
        item: &NavigationItem,
    ) -> bool {
        let Some(resolved) = user else {
            return false;
        };
        resolved.profile().active
            && navigation::is_visible(item, resolved.profile().role, |module| {
                self.can(user, permissions, PermissionAction::Read, module)
            })
    }

    /// The entries of `items` visible to `user`, in declaration order.
    pub fn visible_navigation<'a>(
        &self,
        user: Option<&ResolvedProfile>,
        permissions: &[RolePermission],
        items: &'a [NavigationItem],
    ) -> Vec<&'a NavigationItem> {
        items
            .iter()
            .filter(|item| self.can_view(user, permissions, item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use wastetrack_entity::permission::module;
    use wastetrack_entity::user::UserRole;

    fn authoritative(role: UserRole) -> ResolvedProfile {
        ResolvedProfile::Authoritative(testing::profile(role))
    }

    #[test]
    fn test_empty_permissions_deny_everything() {
        for m in module::ALL {
            for action in [PermissionAction::Read, PermissionAction::Write, PermissionAction::Delete] {
                assert!(!has_permission(&[], m, action));
            }
        }
        assert!(!has_permission(&[], "", PermissionAction::Read));
    }

    #[test]
    fn test_module_match_is_exact() {
        let rows = vec![RolePermission::new(UserRole::Supervisor, "residuos").with(PermissionAction::Read)];
        assert!(has_permission(&rows, "residuos", PermissionAction::Read));
        assert!(!has_permission(&rows, "Residuos", PermissionAction::Read));
        assert!(!has_permission(&rows, "residuos", PermissionAction::Write));
    }

    #[test]
    fn test_rule_order() {
        let policy = AccessPolicy::default();
        let rows = vec![
            RolePermission::new(UserRole::Supervisor, module::REPORTS)
                .with(PermissionAction::Read)
                .with(PermissionAction::Write),
        ];

        assert!(!policy.can(None, &rows, PermissionAction::Read, module::REPORTS));

        let user = authoritative(UserRole::Supervisor);
        assert!(policy.can(Some(&user), &rows, PermissionAction::Write, module::REPORTS));

        let mut inactive = testing::profile(UserRole::Supervisor);
        inactive.active = false;
        let inactive = ResolvedProfile::Authoritative(inactive);
        assert!(!policy.can(Some(&inactive), &rows, PermissionAction::Read, module::REPORTS));

        let degraded = ResolvedProfile::Degraded {
            profile: testing::profile(UserRole::Supervisor),
            reason: "timeout".into(),
        };
        assert!(policy.can(Some(&degraded), &rows, PermissionAction::Read, module::REPORTS));
        assert!(!policy.can(Some(&degraded), &rows, PermissionAction::Write, module::REPORTS));
    }

    #[test]
    fn test_degraded_writes_can_be_enabled() {
        let policy = AccessPolicy::new(&SessionConfig {
            allow_degraded_writes: true,
            ..SessionConfig::default()
        });
        let rows = vec![RolePermission::new(UserRole::Generator, module::WASTE).with(PermissionAction::Write)];
        let degraded = ResolvedProfile::Degraded {
            profile: testing::profile(UserRole::Generator),
            reason: "timeout".into(),
        };
        assert!(policy.can(Some(&degraded), &rows, PermissionAction::Write, module::WASTE));
    }

    #[test]
    fn test_admin_bypass() {
        let admin = authoritative(UserRole::Admin);
        assert!(!AccessPolicy::default().can(Some(&admin), &[], PermissionAction::Delete, module::USERS));

        let bypass = AccessPolicy::new(&SessionConfig {
            admin_bypass: true,
            ..SessionConfig::default()
        });
        assert!(bypass.can(Some(&admin), &[], PermissionAction::Delete, module::USERS));

        let supervisor = authoritative(UserRole::Supervisor);
        assert!(!bypass.can(Some(&supervisor), &[], PermissionAction::Read, module::USERS));
    }

    #[test]
    fn test_menu_gate_matches_filter_navigation() {
        let items = wastetrack_entity::navigation::default_navigation();
        let policy = AccessPolicy::default();

        for role in UserRole::ALL {
            let rows = vec![
                RolePermission::new(role, module::WASTE).with(PermissionAction::Read),
                RolePermission::new(role, module::REPORTS).with(PermissionAction::Write),
            ];
            let user = authoritative(role);
            assert_eq!(
                policy.visible_navigation(Some(&user), &rows, items),
                super::navigation::filter_navigation(items, role, &rows)
            );
        }
    }

    #[test]
    fn test_require_maps_to_authorization_error() {
        let user = authoritative(UserRole::Transporter);
        let err = AccessPolicy::default()
            .require(Some(&user), &[], PermissionAction::Read, module::USERS)
            .unwrap_err();
        assert!(err.is(wastetrack_core::error::ErrorKind::Authorization));
        assert!(err.message.contains("transportista"));
    }
}
