//! Names of the dashboard's functional modules.
//!
//! Modules are free-form strings in the `permisos` table; these are the
//! ones the built-in navigation refers to.

/// Waste registration and listing.
pub const WASTE: &str = "residuos";
/// Label printing and scanning.
pub const LABELS: &str = "etiquetas";
/// Weighing and delivery to external handlers.
pub const DELIVERIES: &str = "entregas";
/// External handler reception.
pub const HANDLERS: &str = "gestores";
/// Incident log.
pub const INCIDENTS: &str = "incidencias";
/// Compliance reports.
pub const REPORTS: &str = "reportes";
/// User administration.
pub const USERS: &str = "usuarios";
/// Permission table administration.
pub const PERMISSIONS: &str = "permisos";

/// Every known module.
pub const ALL: [&str; 8] = [
    WASTE,
    LABELS,
    DELIVERIES,
    HANDLERS,
    INCIDENTS,
    REPORTS,
    USERS,
    PERMISSIONS,
];
