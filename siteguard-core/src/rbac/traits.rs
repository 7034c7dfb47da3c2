//! Collaborator contracts consumed by the engine
//!
//! The engine never touches storage itself. Implement these traits over the
//! backend's membership and project tables (or use
//! [`MemoryDirectory`](super::MemoryDirectory) in tests).

use super::{MembershipRole, OrgRole};
use crate::error::{RbacError, RbacResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Project membership row, as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Raw storage-layer role tag
    pub role: MembershipRole,
    /// Member belongs to an outside company
    pub is_external: bool,
}

impl MembershipRecord {
    pub fn new(role: impl Into<MembershipRole>, is_external: bool) -> Self {
        Self { role: role.into(), is_external }
    }
}

/// Finds the membership of an account in a project
#[async_trait::async_trait]
pub trait MembershipLookup: Send + Sync {
    /// Zero or one membership row per (project, account)
    async fn find_membership(
        &self,
        project_id: &str,
        account_id: &str,
    ) -> Result<Option<MembershipRecord>>;
}

/// Answers the two questions ownership resolution needs
#[async_trait::async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// Identifier of the project's owner (an account or an organization)
    async fn project_owner_id(&self, project_id: &str) -> Result<Option<String>>;

    /// Role of an account inside an organization; `None` if `org_id` is not an
    /// organization or the account is not a member
    async fn org_admin_role(&self, org_id: &str, account_id: &str) -> Result<Option<OrgRole>>;
}

#[async_trait::async_trait]
impl<L: MembershipLookup + ?Sized> MembershipLookup for Arc<L> {
    async fn find_membership(
        &self,
        project_id: &str,
        account_id: &str,
    ) -> Result<Option<MembershipRecord>> {
        (**self).find_membership(project_id, account_id).await
    }
}

#[async_trait::async_trait]
impl<L: OwnershipLookup + ?Sized> OwnershipLookup for Arc<L> {
    async fn project_owner_id(&self, project_id: &str) -> Result<Option<String>> {
        (**self).project_owner_id(project_id).await
    }

    async fn org_admin_role(&self, org_id: &str, account_id: &str) -> Result<Option<OrgRole>> {
        (**self).org_admin_role(org_id, account_id).await
    }
}

/// Run a collaborator lookup, mapping its failure (or expiry) to [`RbacError`]
pub(crate) async fn bounded<T, F>(lookup: &'static str, limit: Option<Duration>, fut: F) -> RbacResult<T>
where
    F: Future<Output = Result<T>>,
{
    let outcome = match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            RbacError::LookupTimeout { lookup, timeout_ms: limit.as_millis() as u64 }
        })?,
        None => fut.await,
    };
    outcome.map_err(|source| RbacError::LookupFailed { lookup, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_maps_errors() {
        let ok: RbacResult<u8> = bounded("membership", None, async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let failed: RbacResult<u8> =
            bounded("membership", None, async { Err(anyhow::anyhow!("boom")) }).await;
        assert!(matches!(failed, Err(RbacError::LookupFailed { lookup: "membership", .. })));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(1u8)
        };
        let result = bounded("project owner", Some(Duration::from_millis(10)), slow).await;
        assert!(matches!(result, Err(RbacError::LookupTimeout { timeout_ms: 10, .. })));
    }
}
