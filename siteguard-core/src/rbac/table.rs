//! Static role → permission table

use super::{BusinessRole, Permission};
use crate::error::{RbacError, RbacResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Maps each business role to the permissions it grants
///
/// The table always holds an entry for every [`BusinessRole`], and no entry is
/// empty. Roles with overlapping grants are combined with a set union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionTable {
    grants: HashMap<BusinessRole, BTreeSet<Permission>>,
}

impl Default for RolePermissionTable {
    fn default() -> Self {
        use Permission::*;

        let mut grants = HashMap::new();
        grants.insert(BusinessRole::ProjectManager, Permission::ALL.iter().copied().collect());
        grants.insert(
            BusinessRole::ProjectEngineer,
            BTreeSet::from([
                ProjectRead,
                MemberRead,
                TaskRead,
                TaskCreate,
                TaskUpdate,
                TaskDelete,
                BlueprintRead,
                BlueprintUpload,
                BlueprintDelete,
                InspectionRead,
                InspectionCreate,
                FileRead,
                FileUpload,
                FileDelete,
                AcceptanceRead,
                AcceptanceCreate,
                ProblemRead,
                ProblemCreate,
                ProblemResolve,
            ]),
        );
        grants.insert(
            BusinessRole::QualityInspector,
            BTreeSet::from([
                ProjectRead,
                TaskRead,
                BlueprintRead,
                InspectionRead,
                InspectionCreate,
                InspectionApprove,
                FileRead,
                FileUpload,
                AcceptanceRead,
                AcceptanceCreate,
                AcceptanceApprove,
                ProblemRead,
                ProblemCreate,
            ]),
        );
        grants.insert(
            BusinessRole::SiteSupervisor,
            BTreeSet::from([
                ProjectRead,
                MemberRead,
                TaskRead,
                TaskCreate,
                TaskUpdate,
                BlueprintRead,
                InspectionRead,
                InspectionCreate,
                FileRead,
                FileUpload,
                AcceptanceRead,
                ProblemRead,
                ProblemCreate,
                ProblemResolve,
            ]),
        );
        grants.insert(
            BusinessRole::Collaborator,
            BTreeSet::from([
                ProjectRead,
                TaskRead,
                TaskUpdate,
                BlueprintRead,
                FileRead,
                FileUpload,
                ProblemRead,
                ProblemCreate,
            ]),
        );
        grants.insert(
            BusinessRole::Observer,
            BTreeSet::from([
                ProjectRead,
                TaskRead,
                BlueprintRead,
                InspectionRead,
                FileRead,
                AcceptanceRead,
                ProblemRead,
            ]),
        );

        Self { grants }
    }
}

impl RolePermissionTable {
    /// Build a table from textual definitions layered over the default catalogue
    ///
    /// Each key is a business role identifier and each value lists permission
    /// identifiers. Roles not mentioned keep their default grants.
    pub fn from_definitions(definitions: &BTreeMap<String, Vec<String>>) -> RbacResult<Self> {
        let mut table = Self::default();
        for (role, permissions) in definitions {
            let role: BusinessRole = role.parse()?;
            let permissions = permissions
                .iter()
                .map(|p| p.parse::<Permission>())
                .collect::<RbacResult<BTreeSet<_>>>()?;
            table = table.with_grants(role, permissions)?;
        }
        Ok(table)
    }

    /// Replace the grants of one role
    pub fn with_grants(
        mut self,
        role: BusinessRole,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> RbacResult<Self> {
        let permissions: BTreeSet<Permission> = permissions.into_iter().collect();
        if permissions.is_empty() {
            return Err(RbacError::EmptyRole(role.to_string()));
        }
        self.grants.insert(role, permissions);
        Ok(self)
    }

    /// Permissions granted by a single role
    pub fn permissions_of(&self, role: BusinessRole) -> impl Iterator<Item = Permission> + '_ {
        self.grants.get(&role).into_iter().flat_map(|set| set.iter().copied())
    }

    /// Whether a single role grants a permission
    pub fn grants(&self, role: BusinessRole, permission: Permission) -> bool {
        self.grants.get(&role).is_some_and(|set| set.contains(&permission))
    }

    /// Union of the permissions granted by every role
    pub fn union_of<'a>(
        &self,
        roles: impl IntoIterator<Item = &'a BusinessRole>,
    ) -> BTreeSet<Permission> {
        roles.into_iter().flat_map(|role| self.permissions_of(*role)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_every_role() {
        let table = RolePermissionTable::default();
        for role in BusinessRole::ALL {
            assert!(table.permissions_of(*role).next().is_some(), "{} grants nothing", role);
        }
    }

    #[test]
    fn test_highest_role_grants_whole_catalogue() {
        let table = RolePermissionTable::default();
        let granted: BTreeSet<_> = table.permissions_of(BusinessRole::HIGHEST).collect();
        assert_eq!(granted.len(), Permission::ALL.len());
    }

    #[test]
    fn test_union_is_superset_of_each_role() {
        let table = RolePermissionTable::default();
        let roles = [BusinessRole::QualityInspector, BusinessRole::SiteSupervisor];
        let union = table.union_of(&roles);

        for role in roles {
            for permission in table.permissions_of(role) {
                assert!(union.contains(&permission));
            }
        }
        // Overlapping grants are not double counted
        let overlap = table.union_of(&[BusinessRole::Observer, BusinessRole::Observer]);
        assert_eq!(overlap.len(), table.permissions_of(BusinessRole::Observer).count());
    }

    #[test]
    fn test_from_definitions_overrides_named_roles_only() {
        let mut definitions = BTreeMap::new();
        definitions.insert("observer".to_string(), vec!["project:read".to_string()]);

        let table = RolePermissionTable::from_definitions(&definitions).unwrap();
        assert!(table.grants(BusinessRole::Observer, Permission::ProjectRead));
        assert!(!table.grants(BusinessRole::Observer, Permission::TaskRead));
        assert!(table.grants(BusinessRole::Collaborator, Permission::TaskUpdate));
    }

    #[test]
    fn test_from_definitions_rejects_bad_entries() {
        let mut unknown_role = BTreeMap::new();
        unknown_role.insert("foreman".to_string(), vec!["task:read".to_string()]);
        assert!(matches!(
            RolePermissionTable::from_definitions(&unknown_role),
            Err(RbacError::UnknownRole(_))
        ));

        let mut unknown_permission = BTreeMap::new();
        unknown_permission.insert("observer".to_string(), vec!["task:paint".to_string()]);
        assert!(matches!(
            RolePermissionTable::from_definitions(&unknown_permission),
            Err(RbacError::UnknownPermission(_))
        ));

        let mut empty = BTreeMap::new();
        empty.insert("observer".to_string(), vec![]);
        assert!(matches!(
            RolePermissionTable::from_definitions(&empty),
            Err(RbacError::EmptyRole(_))
        ));
    }
}
