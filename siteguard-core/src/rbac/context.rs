//! Resolved authorization snapshot for one (account, project) pair

use super::{BusinessRole, MembershipRecord, Permission, RolePermissionTable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Project identifier as stored by the backend
pub type ProjectId = String;

/// Account identifier as stored by the backend
pub type AccountId = String;

/// Authorization snapshot for one account inside one project
///
/// A context only exists for callers with a membership or ownership; an
/// unrelated caller has no context rather than an empty one. Instances are
/// immutable once built and are shared behind `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionContext {
    account_id: AccountId,
    project_id: ProjectId,
    business_roles: BTreeSet<BusinessRole>,
    permissions: BTreeSet<Permission>,
    is_owner: bool,
    is_external: bool,
    loaded_at: DateTime<Utc>,
}

impl PermissionContext {
    /// Combine membership and ownership into a context
    ///
    /// Returns `None` when the account neither owns the project nor holds a
    /// membership in it. Ownership supersedes any membership record.
    pub fn resolve(
        project_id: &str,
        account_id: &str,
        membership: Option<&MembershipRecord>,
        is_owner: bool,
        table: &RolePermissionTable,
    ) -> Option<Self> {
        let (business_roles, is_external): (BTreeSet<BusinessRole>, bool) = match membership {
            _ if is_owner => (BTreeSet::from([BusinessRole::HIGHEST]), false),
            Some(record) => (record.role.business_roles().into_iter().collect(), record.is_external),
            None => return None,
        };

        let permissions = table.union_of(&business_roles);

        Some(Self {
            account_id: account_id.to_string(),
            project_id: project_id.to_string(),
            business_roles,
            permissions,
            is_owner,
            is_external,
            loaded_at: Utc::now(),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn business_roles(&self) -> &BTreeSet<BusinessRole> {
        &self.business_roles
    }

    /// Permissions granted by the business roles
    ///
    /// For owners this is not the effective set: see [`PermissionContext::grants`].
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn is_external(&self) -> bool {
        self.is_external
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Effective permission check; owners are granted everything
    pub fn grants(&self, permission: Permission) -> bool {
        self.is_owner || self.permissions.contains(&permission)
    }

    /// Role check; ownership does not imply holding every role
    pub fn holds_role(&self, role: BusinessRole) -> bool {
        self.business_roles.contains(&role)
    }

    /// Whether two contexts confer the same authority, ignoring load time
    pub fn same_authority(&self, other: &Self) -> bool {
        self.account_id == other.account_id
            && self.project_id == other.project_id
            && self.business_roles == other.business_roles
            && self.permissions == other.permissions
            && self.is_owner == other.is_owner
            && self.is_external == other.is_external
    }
}
