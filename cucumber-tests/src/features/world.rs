use cucumber::World as CucumberWorld;
use siteguard_core::http::GuardDecision;
use siteguard_core::rbac::{
    BusinessRole, ContextSnapshot, MemoryDirectory, Permission, PermissionService,
    RolePermissionTable,
};
use std::sync::Arc;

/// Shared state for one scenario
#[derive(CucumberWorld)]
#[world(init = Self::new)]
pub struct PermissionWorld {
    /// Membership and ownership data the service resolves against
    pub directory: MemoryDirectory,
    /// Role table used when the service is first built
    pub table: RolePermissionTable,
    service: Option<Arc<PermissionService>>,
    /// Results of the loads performed in this scenario, oldest first
    pub loads: Vec<ContextSnapshot>,
    pub last_decision: Option<GuardDecision>,
}

impl std::fmt::Debug for PermissionWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionWorld")
            .field("directory", &"<MemoryDirectory>")
            .field("table", &self.table)
            .field("service", &self.service.as_ref().map(|_| "<PermissionService>"))
            .field("loads", &self.loads)
            .field("last_decision", &self.last_decision)
            .finish()
    }
}

impl PermissionWorld {
    pub fn new() -> Self {
        Self {
            directory: MemoryDirectory::new(),
            table: RolePermissionTable::default(),
            service: None,
            loads: Vec::new(),
            last_decision: None,
        }
    }

    /// The service, built on first use with the scenario's role table
    pub fn service(&mut self) -> Arc<PermissionService> {
        if let Some(service) = &self.service {
            return service.clone();
        }
        let lookup = Arc::new(self.directory.clone());
        let service = Arc::new(
            PermissionService::new(lookup.clone(), lookup).with_table(self.table.clone()),
        );
        self.service = Some(service.clone());
        service
    }

    /// Replace one role's grants; only valid before the service is built
    pub fn restrict_role(&mut self, role: BusinessRole, permissions: Vec<Permission>) {
        assert!(self.service.is_none(), "role table must be set before any load");
        self.table = self
            .table
            .clone()
            .with_grants(role, permissions)
            .expect("role grants must not be empty");
    }

    pub async fn open_project(&mut self, account: &str, project: &str) -> ContextSnapshot {
        let loaded = self.service().load_context(project, account).await;
        self.loads.push(loaded.clone());
        loaded
    }
}

impl Default for PermissionWorld {
    fn default() -> Self {
        Self::new()
    }
}
