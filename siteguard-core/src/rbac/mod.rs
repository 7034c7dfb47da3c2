//! SiteGuard RBAC (Role-Based Access Control) engine
//!
//! Resolves the permission context of an account inside a construction
//! project and answers authorization queries against it.
//!
//! # Components
//! - [`RolePermissionTable`]: static business role → permissions table
//! - [`OwnershipResolver`]: direct or organization ownership, fail-closed
//! - [`PermissionService`]: context resolution, cache and change notification
//! - [`Authorizer`]: synchronous query surface used by guards and directives
//!
//! # Example
//! ```rust,ignore
//! let directory = Arc::new(MemoryDirectory::new());
//! let service = PermissionService::new(directory.clone(), directory);
//!
//! service.load_context("tower", "alice").await;
//! if service.has_permission(Permission::TaskCreate) {
//!     // show the "new task" button
//! }
//! service.clear_context();
//! ```

mod authorizer;
mod context;
mod memory;
mod ownership;
mod permissions;
mod roles;
mod service;
mod table;
mod traits;

// Public exports
pub use authorizer::Authorizer;
pub use context::{AccountId, PermissionContext, ProjectId};
pub use memory::{LookupKind, MemoryDirectory};
pub use ownership::{Ownership, OwnershipResolver};
pub use permissions::{Permission, RequireMode};
pub use roles::{BusinessRole, MembershipRole, OrgRole};
pub use service::{ContextSnapshot, LoadFailure, PermissionService};
pub use table::RolePermissionTable;
pub use traits::{MembershipLookup, MembershipRecord, OwnershipLookup};
