//! Permission service: context resolution, cache and change notification
//!
//! The service holds at most one live [`PermissionContext`] for the session.
//! `load_context` is the only suspending operation; every query reads the
//! cached snapshot, which is replaced by a single `Arc` swap.
//!
//! Overlapping loads are sequenced with tickets. Each load (and each clear)
//! takes a new ticket, and a load only installs its result if its ticket is
//! still the newest when it completes. A superseded load returns `None`.

use super::traits::{bounded, MembershipLookup, OwnershipLookup};
use super::{Authorizer, OwnershipResolver, PermissionContext, RolePermissionTable};
use crate::config::RbacConfig;
use crate::error::{RbacError, RbacResult};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Snapshot published to subscribers on every context change
pub type ContextSnapshot = Option<Arc<PermissionContext>>;

const FAILURE_CHANNEL_CAPACITY: usize = 16;

/// A context load that failed and was turned into "no access"
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub project_id: String,
    pub account_id: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
struct Slot {
    ticket: u64,
    context: ContextSnapshot,
}

/// Resolves, caches and serves the permission context of the current session
pub struct PermissionService {
    memberships: Arc<dyn MembershipLookup>,
    ownership: OwnershipResolver,
    table: Arc<RolePermissionTable>,
    lookup_timeout: Option<Duration>,
    slot: RwLock<Slot>,
    changes: watch::Sender<ContextSnapshot>,
    failures: broadcast::Sender<LoadFailure>,
    last_failure: Mutex<Option<LoadFailure>>,
}

impl PermissionService {
    /// Create a service with the default role table
    pub fn new(memberships: Arc<dyn MembershipLookup>, ownership: Arc<dyn OwnershipLookup>) -> Self {
        let (changes, _) = watch::channel(None);
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self {
            memberships,
            ownership: OwnershipResolver::new(ownership),
            table: Arc::new(RolePermissionTable::default()),
            lookup_timeout: None,
            slot: RwLock::new(Slot::default()),
            changes,
            failures,
            last_failure: Mutex::new(None),
        }
    }

    /// Create a service from configuration (role table override, lookup timeout)
    pub fn from_config(
        config: &RbacConfig,
        memberships: Arc<dyn MembershipLookup>,
        ownership: Arc<dyn OwnershipLookup>,
    ) -> RbacResult<Self> {
        config.validate()?;
        Ok(Self::new(memberships, ownership)
            .with_table(config.role_table()?)
            .with_lookup_timeout(config.lookup_timeout()))
    }

    pub fn with_table(mut self, table: RolePermissionTable) -> Self {
        self.table = Arc::new(table);
        self
    }

    /// Bound every collaborator lookup; expiry counts as a lookup failure
    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self.ownership = self.ownership.with_timeout(timeout);
        self
    }

    pub fn table(&self) -> &RolePermissionTable {
        &self.table
    }

    /// Resolve and cache the context for (project, account)
    ///
    /// Returns `None` when the account has no access to the project, when a
    /// lookup failed, or when a newer load or clear superseded this one. Lookup
    /// errors are logged and published on [`PermissionService::failures`],
    /// never returned.
    pub async fn load_context(&self, project_id: &str, account_id: &str) -> ContextSnapshot {
        let ticket = self.begin_load();
        log::debug!("Loading permission context for {} in {} (#{})", account_id, project_id, ticket);

        match self.resolve(project_id, account_id).await {
            Ok(context) => {
                let context = context.map(Arc::new);
                if !self.install(ticket, context.clone()) {
                    log::debug!(
                        "Discarding superseded permission context for {} in {} (#{})",
                        account_id,
                        project_id,
                        ticket
                    );
                    return None;
                }
                match &context {
                    Some(ctx) => log::info!(
                        "Permission context loaded for {} in {}: roles={:?} owner={} external={}",
                        account_id,
                        project_id,
                        ctx.business_roles(),
                        ctx.is_owner(),
                        ctx.is_external()
                    ),
                    None => log::info!("Account {} has no access to project {}", account_id, project_id),
                }
                context
            }
            Err(e) => {
                if self.install(ticket, None) {
                    log::warn!(
                        "Permission context for {} in {} failed, denying access: {}",
                        account_id,
                        project_id,
                        e
                    );
                    self.record_failure(project_id, account_id, &e);
                } else {
                    log::debug!(
                        "Ignoring failure of superseded load for {} in {} (#{})",
                        account_id,
                        project_id,
                        ticket
                    );
                }
                None
            }
        }
    }

    /// Drop the cached context (navigation away, logout)
    ///
    /// Any load still in flight is superseded and will not install its result.
    pub fn clear_context(&self) {
        let had_context = {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            slot.ticket += 1;
            slot.context.take().is_some()
        };
        self.publish();
        if had_context {
            log::debug!("Permission context cleared");
        }
    }

    /// Receiver notified on every context change
    ///
    /// The published value always catches up with the cached context, so a
    /// subscriber may query the service while holding a borrow.
    pub fn subscribe(&self) -> watch::Receiver<ContextSnapshot> {
        self.changes.subscribe()
    }

    /// Receiver of load failures
    pub fn failures(&self) -> broadcast::Receiver<LoadFailure> {
        self.failures.subscribe()
    }

    /// Most recent load failure, if any
    pub fn last_failure(&self) -> Option<LoadFailure> {
        self.last_failure.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn resolve(&self, project_id: &str, account_id: &str) -> RbacResult<Option<PermissionContext>> {
        let (membership, ownership) = tokio::join!(
            bounded(
                "membership",
                self.lookup_timeout,
                self.memberships.find_membership(project_id, account_id)
            ),
            self.ownership.resolve(project_id, account_id),
        );
        let membership = membership?;

        Ok(PermissionContext::resolve(
            project_id,
            account_id,
            membership.as_ref(),
            ownership.is_owner(),
            &self.table,
        ))
    }

    /// Take a ticket and hide the previous context while the load is in flight
    fn begin_load(&self) -> u64 {
        let (ticket, hid_context) = {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            slot.ticket += 1;
            (slot.ticket, slot.context.take().is_some())
        };
        if hid_context {
            self.publish();
        }
        ticket
    }

    /// Install a result if `ticket` is still the newest; returns whether it was installed
    fn install(&self, ticket: u64, context: ContextSnapshot) -> bool {
        {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            if slot.ticket != ticket {
                return false;
            }
            slot.context = context;
        }
        self.publish();
        true
    }

    /// Notify subscribers with the cached context, read after the slot lock is released
    fn publish(&self) {
        self.changes.send_modify(|published| *published = self.current_context());
    }

    fn record_failure(&self, project_id: &str, account_id: &str, error: &RbacError) {
        let failure = LoadFailure {
            project_id: project_id.to_string(),
            account_id: account_id.to_string(),
            message: error.to_string(),
            at: Utc::now(),
        };
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(failure.clone());
        // No subscribers is fine
        let _ = self.failures.send(failure);
    }
}

impl Authorizer for PermissionService {
    fn current_context(&self) -> ContextSnapshot {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).context.clone()
    }
}
