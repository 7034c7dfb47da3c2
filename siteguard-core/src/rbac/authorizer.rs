//! Authorization query surface
//!
//! Every query is a synchronous read of the current snapshot and degrades to
//! "deny" when no context is loaded. Implementors only supply
//! [`Authorizer::current_context`].

use super::{BusinessRole, Permission, PermissionContext};
use std::sync::Arc;

/// Predicates evaluated against a (possibly absent) permission context
pub trait Authorizer {
    /// Snapshot of the active context, if any
    fn current_context(&self) -> Option<Arc<PermissionContext>>;

    fn has_context(&self) -> bool {
        self.current_context().is_some()
    }

    /// Owners are granted every permission
    fn has_permission(&self, permission: Permission) -> bool {
        self.current_context().is_some_and(|ctx| ctx.grants(permission))
    }

    /// At least one of `permissions`; an empty list is never satisfied
    fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        self.current_context()
            .is_some_and(|ctx| permissions.iter().any(|p| ctx.grants(*p)))
    }

    /// Every one of `permissions`; an empty list is always satisfied
    fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        match self.current_context() {
            Some(ctx) => permissions.iter().all(|p| ctx.grants(*p)),
            None => permissions.is_empty(),
        }
    }

    /// Ownership does not imply holding every role
    fn has_role(&self, role: BusinessRole) -> bool {
        self.current_context().is_some_and(|ctx| ctx.holds_role(role))
    }

    fn has_any_role(&self, roles: &[BusinessRole]) -> bool {
        self.current_context().is_some_and(|ctx| roles.iter().any(|r| ctx.holds_role(*r)))
    }

    fn is_owner(&self) -> bool {
        self.current_context().is_some_and(|ctx| ctx.is_owner())
    }

    fn is_external(&self) -> bool {
        self.current_context().is_some_and(|ctx| ctx.is_external())
    }

    /// Permissions granted by the context's roles; empty without context
    fn permissions(&self) -> Vec<Permission> {
        self.current_context()
            .map(|ctx| ctx.permissions().iter().copied().collect())
            .unwrap_or_default()
    }

    fn roles(&self) -> Vec<BusinessRole> {
        self.current_context()
            .map(|ctx| ctx.business_roles().iter().copied().collect())
            .unwrap_or_default()
    }

    fn current_project_id(&self) -> Option<String> {
        self.current_context().map(|ctx| ctx.project_id().to_string())
    }

    fn current_account_id(&self) -> Option<String> {
        self.current_context().map(|ctx| ctx.account_id().to_string())
    }
}

/// A bare snapshot answers queries too (used by directives and tests)
impl Authorizer for Option<Arc<PermissionContext>> {
    fn current_context(&self) -> Option<Arc<PermissionContext>> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{MembershipRecord, RolePermissionTable};

    fn two_role_table() -> RolePermissionTable {
        RolePermissionTable::default()
            .with_grants(BusinessRole::QualityInspector, [Permission::ProjectRead])
            .unwrap()
            .with_grants(BusinessRole::Observer, [Permission::TaskUpdate])
            .unwrap()
    }

    fn snapshot(role: &str, owner: bool) -> Option<Arc<PermissionContext>> {
        let record = MembershipRecord::new(role, false);
        PermissionContext::resolve("tower", "bob", Some(&record), owner, &two_role_table())
            .map(Arc::new)
    }

    #[test]
    fn test_no_context_defaults() {
        let none: Option<Arc<PermissionContext>> = None;
        assert!(!none.has_context());
        assert!(!none.has_permission(Permission::ProjectRead));
        assert!(!none.has_any_permission(&[Permission::ProjectRead]));
        assert!(!none.has_all_permissions(&[Permission::ProjectRead]));
        assert!(!none.has_role(BusinessRole::Observer));
        assert!(!none.has_any_role(&[BusinessRole::Observer]));
        assert!(!none.is_owner());
        assert!(none.permissions().is_empty());
        assert!(none.roles().is_empty());
        assert_eq!(none.current_project_id(), None);
    }

    #[test]
    fn test_empty_list_asymmetry() {
        let ctx = snapshot("viewer", false);
        assert!(!ctx.has_any_permission(&[]));
        assert!(ctx.has_all_permissions(&[]));
        assert!(!ctx.has_any_role(&[]));
    }

    #[test]
    fn test_two_roles_combine() {
        // "inspector" maps to QualityInspector + Observer
        let ctx = snapshot("inspector", false);
        assert!(ctx.has_all_permissions(&[Permission::ProjectRead, Permission::TaskUpdate]));
        assert!(ctx.has_any_permission(&[Permission::ProjectDelete, Permission::TaskUpdate]));
        assert!(!ctx.has_permission(Permission::ProjectDelete));
        assert!(ctx.has_role(BusinessRole::QualityInspector));
        assert!(!ctx.has_role(BusinessRole::SiteSupervisor));
        assert!(ctx.has_any_role(&[BusinessRole::SiteSupervisor, BusinessRole::Observer]));
    }

    #[test]
    fn test_owner_short_circuit() {
        let ctx = snapshot("viewer", true);
        assert!(ctx.is_owner());
        for permission in Permission::ALL {
            assert!(ctx.has_permission(*permission));
        }
        assert!(ctx.has_all_permissions(Permission::ALL));
        assert!(ctx.has_role(BusinessRole::HIGHEST));
        assert!(!ctx.has_role(BusinessRole::Observer));
    }
}
