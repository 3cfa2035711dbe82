//! Navigation filtering by role and permission rows.

use wastetrack_entity::navigation::NavigationItem;
use wastetrack_entity::permission::{PermissionAction, RolePermission};
use wastetrack_entity::user::UserRole;

use super::policy::has_permission;

/// Whether `item` is visible to `role`, given a read check for its module.
///
/// The role must be on the allow-list and, when the entry names a module,
/// `can_read` must accept it.
pub fn is_visible(item: &NavigationItem, role: UserRole, can_read: impl Fn(&str) -> bool) -> bool {
    item.allows_role(role) && item.module.is_none_or(can_read)
}

/// Entries of `items` that `role` may see, in declaration order.
///
/// An entry passes when `role` is on its allow-list and, if it names a
/// module, `permissions` grant read on that module.
pub fn filter_navigation<'a>(
    items: &'a [NavigationItem],
    role: UserRole,
    permissions: &[RolePermission],
) -> Vec<&'a NavigationItem> {
    items
        .iter()
        .filter(|item| {
            is_visible(item, role, |module| {
                has_permission(permissions, module, PermissionAction::Read)
            })
        })
        .collect()
}
