//! In-memory membership and ownership directory
//!
//! Implements both lookup contracts over plain maps guarded by `RwLock`.
//! Suitable for tests, demos and single-process tools. Failures and latency
//! can be injected per lookup kind to exercise fail-closed paths.

use super::traits::{MembershipLookup, OwnershipLookup};
use super::{MembershipRecord, MembershipRole, OrgRole};
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// The lookups a [`MemoryDirectory`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Membership,
    ProjectOwner,
    OrgRole,
}

#[derive(Default)]
struct Tables {
    project_owners: HashMap<String, String>,
    memberships: HashMap<(String, String), MembershipRecord>,
    org_roles: HashMap<(String, String), OrgRole>,
    failing: HashSet<LookupKind>,
    delay: Option<Duration>,
    project_delays: HashMap<String, Duration>,
}

/// Shared in-memory directory; clones see the same data
///
/// # Example
///
/// ```
/// use siteguard_core::rbac::MemoryDirectory;
///
/// let directory = MemoryDirectory::new();
/// directory.add_project("tower", "alice");
/// directory.add_membership("tower", "bob", "engineer", false);
/// ```
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        f(&tables)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut tables)
    }

    /// Register a project and its owner (account or organization id)
    pub fn add_project(&self, project_id: &str, owner_id: &str) {
        self.write(|t| t.project_owners.insert(project_id.to_string(), owner_id.to_string()));
    }

    pub fn add_membership(
        &self,
        project_id: &str,
        account_id: &str,
        role: impl Into<MembershipRole>,
        is_external: bool,
    ) {
        let record = MembershipRecord::new(role, is_external);
        self.write(|t| {
            t.memberships.insert((project_id.to_string(), account_id.to_string()), record)
        });
    }

    pub fn remove_membership(&self, project_id: &str, account_id: &str) {
        self.write(|t| t.memberships.remove(&(project_id.to_string(), account_id.to_string())));
    }

    pub fn add_org_role(&self, org_id: &str, account_id: &str, role: impl Into<OrgRole>) {
        let role = role.into();
        self.write(|t| t.org_roles.insert((org_id.to_string(), account_id.to_string()), role));
    }

    /// Make every lookup of this kind return an error
    pub fn fail(&self, kind: LookupKind) {
        self.write(|t| t.failing.insert(kind));
    }

    pub fn recover(&self, kind: LookupKind) {
        self.write(|t| t.failing.remove(&kind));
    }

    /// Delay every lookup
    pub fn set_delay(&self, delay: Duration) {
        self.write(|t| t.delay = Some(delay));
    }

    /// Delay lookups that concern one project
    pub fn delay_project(&self, project_id: &str, delay: Duration) {
        self.write(|t| t.project_delays.insert(project_id.to_string(), delay));
    }

    async fn simulate(&self, kind: LookupKind, project_id: Option<&str>) -> Result<()> {
        let (delay, failing) = self.read(|t| {
            let delay = project_id.and_then(|p| t.project_delays.get(p).copied()).or(t.delay);
            (delay, t.failing.contains(&kind))
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            bail!("{:?} lookup unavailable", kind);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MembershipLookup for MemoryDirectory {
    async fn find_membership(
        &self,
        project_id: &str,
        account_id: &str,
    ) -> Result<Option<MembershipRecord>> {
        self.simulate(LookupKind::Membership, Some(project_id)).await?;
        Ok(self.read(|t| {
            t.memberships.get(&(project_id.to_string(), account_id.to_string())).cloned()
        }))
    }
}

#[async_trait::async_trait]
impl OwnershipLookup for MemoryDirectory {
    async fn project_owner_id(&self, project_id: &str) -> Result<Option<String>> {
        self.simulate(LookupKind::ProjectOwner, Some(project_id)).await?;
        Ok(self.read(|t| t.project_owners.get(project_id).cloned()))
    }

    async fn org_admin_role(&self, org_id: &str, account_id: &str) -> Result<Option<OrgRole>> {
        self.simulate(LookupKind::OrgRole, None).await?;
        Ok(self.read(|t| t.org_roles.get(&(org_id.to_string(), account_id.to_string())).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_lookups() {
        let directory = MemoryDirectory::new();
        directory.add_project("tower", "acme");
        directory.add_membership("tower", "bob", "supervisor", true);
        directory.add_org_role("acme", "alice", "owner");

        let record = directory.find_membership("tower", "bob").await.unwrap().unwrap();
        assert_eq!(record.role, MembershipRole::Supervisor);
        assert!(record.is_external);
        assert!(directory.find_membership("tower", "zoe").await.unwrap().is_none());

        assert_eq!(directory.project_owner_id("tower").await.unwrap(), Some("acme".to_string()));
        assert_eq!(directory.org_admin_role("acme", "alice").await.unwrap(), Some(OrgRole::Owner));

        directory.remove_membership("tower", "bob");
        assert!(directory.find_membership("tower", "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let directory = MemoryDirectory::new();
        directory.add_project("tower", "alice");
        directory.fail(LookupKind::ProjectOwner);

        assert!(directory.project_owner_id("tower").await.is_err());
        // Other lookups keep working
        assert!(directory.find_membership("tower", "alice").await.is_ok());

        directory.recover(LookupKind::ProjectOwner);
        assert!(directory.project_owner_id("tower").await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let directory = MemoryDirectory::new();
        let clone = directory.clone();
        clone.add_project("tower", "alice");
        assert!(directory.project_owner_id("tower").await.unwrap().is_some());
    }
}
