//! Static dashboard navigation entries.

use serde::Serialize;

use crate::permission::module;
use crate::user::UserRole;
use crate::user::UserRole::{Admin, ExternalHandler, Generator, Supervisor, Transporter};

/// A menu entry, visible to the roles in `allowed_roles` and, when a
/// `module` is declared, only with read permission on that module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    /// Menu label.
    pub title: &'static str,
    /// Dashboard route.
    pub route: &'static str,
    /// Icon name.
    pub icon: &'static str,
    /// Roles that may see the entry.
    pub allowed_roles: &'static [UserRole],
    /// Module whose read permission is also required.
    pub module: Option<&'static str>,
}

impl NavigationItem {
    /// Whether `role` is on the entry's allow-list.
    pub fn allows_role(&self, role: UserRole) -> bool {
        self.allowed_roles.contains(&role)
    }
}

const EVERYONE: &[UserRole] = &[Generator, Supervisor, Transporter, ExternalHandler, Admin];

static DEFAULT_NAVIGATION: [NavigationItem; 10] = [
    NavigationItem {
        title: "Panel",
        route: "/dashboard",
        icon: "home",
        allowed_roles: EVERYONE,
        module: None,
    },
    NavigationItem {
        title: "Registrar residuo",
        route: "/residuos/nuevo",
        icon: "plus",
        allowed_roles: &[Generator, Supervisor, Admin],
        module: Some(module::WASTE),
    },
    NavigationItem {
        title: "Residuos",
        route: "/residuos",
        icon: "trash",
        allowed_roles: &[Generator, Supervisor, Transporter, Admin],
        module: Some(module::WASTE),
    },
    NavigationItem {
        title: "Etiquetas",
        route: "/etiquetas",
        icon: "qr-code",
        allowed_roles: &[Generator, Supervisor, Admin],
        module: Some(module::LABELS),
    },
    NavigationItem {
        title: "Pesaje y entregas",
        route: "/entregas",
        icon: "truck",
        allowed_roles: &[Supervisor, Transporter, Admin],
        module: Some(module::DELIVERIES),
    },
    NavigationItem {
        title: "Recepción externa",
        route: "/gestores",
        icon: "building",
        allowed_roles: &[ExternalHandler, Admin],
        module: Some(module::HANDLERS),
    },
    NavigationItem {
        title: "Incidencias",
        route: "/incidencias",
        icon: "alert-triangle",
        allowed_roles: EVERYONE,
        module: Some(module::INCIDENTS),
    },
    NavigationItem {
        title: "Reportes",
        route: "/reportes",
        icon: "bar-chart",
        allowed_roles: &[Supervisor, Admin],
        module: Some(module::REPORTS),
    },
    NavigationItem {
        title: "Usuarios",
        route: "/usuarios",
        icon: "users",
        allowed_roles: &[Admin],
        module: Some(module::USERS),
    },
    NavigationItem {
        title: "Permisos",
        route: "/permisos",
        icon: "shield",
        allowed_roles: &[Admin],
        module: Some(module::PERMISSIONS),
    },
];

/// The dashboard's built-in menu, in display order.
pub fn default_navigation() -> &'static [NavigationItem] {
    &DEFAULT_NAVIGATION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_sees_dashboard() {
        let dashboard = &default_navigation()[0];
        for role in UserRole::ALL {
            assert!(dashboard.allows_role(role));
        }
    }

    #[test]
    fn test_modules_are_known() {
        for item in default_navigation() {
            if let Some(m) = item.module {
                assert!(module::ALL.contains(&m), "unknown module {m}");
            }
        }
    }
}
