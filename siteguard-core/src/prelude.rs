//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use siteguard_core::prelude::*;
//! ```

// === Configuration ===
pub use crate::config::SiteGuardConfig;
pub use crate::logging::LoggingConfig;

// === Engine ===
pub use crate::rbac::{
    Authorizer, BusinessRole, MembershipLookup, MembershipRecord, MembershipRole, OrgRole,
    OwnershipLookup, Permission, PermissionContext, PermissionService, RequireMode,
    RolePermissionTable,
};

// === Consumers ===
pub use crate::directive::{Rendering, Requirement, StructuralDirective};
pub use crate::http::{GuardResult, RouteGuard, RouteGuards};

// === Errors ===
pub use crate::error::{RbacError, RbacResult};
