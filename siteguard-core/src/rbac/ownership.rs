//! Project ownership resolution
//!
//! An account owns a project either directly (it is the project's owner) or
//! through an organization that owns the project, when the account holds the
//! organization's highest administrative role.
//!
//! Resolution is fail-closed: a failed or empty lookup at either step means
//! "not owner", never an error.

use super::traits::{bounded, OwnershipLookup};
use std::sync::Arc;
use std::time::Duration;

/// How (if at all) an account owns a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The account is the project's owner
    Direct,
    /// The account is the top administrator of the owning organization
    Organization,
    /// Not an owner, or ownership could not be established
    None,
}

impl Ownership {
    pub fn is_owner(&self) -> bool {
        !matches!(self, Ownership::None)
    }
}

/// Resolves ownership through an [`OwnershipLookup`]
#[derive(Clone)]
pub struct OwnershipResolver {
    lookup: Arc<dyn OwnershipLookup>,
    timeout: Option<Duration>,
}

impl OwnershipResolver {
    pub fn new(lookup: Arc<dyn OwnershipLookup>) -> Self {
        Self { lookup, timeout: None }
    }

    /// Bound each of the two lookups
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn is_owner(&self, project_id: &str, account_id: &str) -> bool {
        self.resolve(project_id, account_id).await.is_owner()
    }

    pub async fn resolve(&self, project_id: &str, account_id: &str) -> Ownership {
        let owner_id =
            match bounded("project owner", self.timeout, self.lookup.project_owner_id(project_id))
                .await
            {
                Ok(Some(owner_id)) => owner_id,
                Ok(None) => {
                    log::debug!("Project {} has no owner record", project_id);
                    return Ownership::None;
                }
                Err(e) => {
                    log::warn!("Ownership check for project {} failed closed: {}", project_id, e);
                    return Ownership::None;
                }
            };

        if owner_id == account_id {
            return Ownership::Direct;
        }

        match bounded(
            "organization role",
            self.timeout,
            self.lookup.org_admin_role(&owner_id, account_id),
        )
        .await
        {
            Ok(Some(role)) if role.is_highest() => Ownership::Organization,
            Ok(_) => Ownership::None,
            Err(e) => {
                log::warn!(
                    "Organization ownership check for project {} (owner {}) failed closed: {}",
                    project_id,
                    owner_id,
                    e
                );
                Ownership::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{LookupKind, MemoryDirectory, OrgRole};

    fn directory() -> MemoryDirectory {
        let directory = MemoryDirectory::new();
        directory.add_project("tower", "alice");
        directory.add_project("bridge", "acme");
        directory.add_org_role("acme", "bob", OrgRole::Owner);
        directory.add_org_role("acme", "carol", OrgRole::Admin);
        directory.add_org_role("acme", "dave", OrgRole::Member);
        directory
    }

    #[tokio::test]
    async fn test_direct_owner() {
        let resolver = OwnershipResolver::new(Arc::new(directory()));
        assert_eq!(resolver.resolve("tower", "alice").await, Ownership::Direct);
        assert!(!resolver.is_owner("tower", "bob").await);
    }

    #[tokio::test]
    async fn test_organization_owner_requires_highest_role() {
        let resolver = OwnershipResolver::new(Arc::new(directory()));
        assert_eq!(resolver.resolve("bridge", "bob").await, Ownership::Organization);
        assert!(!resolver.is_owner("bridge", "carol").await);
        assert!(!resolver.is_owner("bridge", "dave").await);
        assert!(!resolver.is_owner("bridge", "erin").await);
    }

    #[tokio::test]
    async fn test_missing_project_is_not_owner() {
        let resolver = OwnershipResolver::new(Arc::new(directory()));
        assert_eq!(resolver.resolve("nowhere", "alice").await, Ownership::None);
    }

    #[tokio::test]
    async fn test_lookup_failures_fail_closed() {
        let dir = directory();
        dir.fail(LookupKind::ProjectOwner);
        let resolver = OwnershipResolver::new(Arc::new(dir.clone()));
        assert!(!resolver.is_owner("tower", "alice").await);

        dir.recover(LookupKind::ProjectOwner);
        dir.fail(LookupKind::OrgRole);
        assert!(resolver.is_owner("tower", "alice").await);
        assert!(!resolver.is_owner("bridge", "bob").await);
    }

    #[tokio::test]
    async fn test_slow_lookup_fails_closed() {
        let dir = directory();
        dir.set_delay(Duration::from_millis(200));
        let resolver =
            OwnershipResolver::new(Arc::new(dir)).with_timeout(Some(Duration::from_millis(10)));
        assert!(!resolver.is_owner("tower", "alice").await);
    }
}
