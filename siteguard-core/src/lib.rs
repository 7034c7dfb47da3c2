//! SiteGuard - Core
//!
//! Permission context resolution and RBAC authorization for construction
//! project management.
//!
//! # Overview
//!
//! For the account currently viewing a project, SiteGuard resolves a
//! [`PermissionContext`](rbac::PermissionContext): the business roles the
//! account holds in that project, the permissions those roles grant, and
//! whether the account owns the project. Route guards and structural
//! directives then ask synchronous questions against the cached context.
//!
//! ```rust,ignore
//! use siteguard_core::prelude::*;
//! use std::sync::Arc;
//!
//! let directory = Arc::new(backend_directory());
//! let service = PermissionService::new(directory.clone(), directory);
//!
//! service.load_context(&project_id, &account_id).await;
//! assert!(service.has_permission(Permission::TaskRead));
//! ```
//!
//! # Architecture
//!
//! - [`rbac`] - Role table, ownership resolver, permission service, query surface
//! - [`http`] - Route guards for navigation
//! - [`directive`] - Conditional views that follow context changes
//! - [`config`] - TOML + environment configuration
//! - [`logging`] - Declarative logging on the standard `log` crate
//! - [`error`] - Engine error type

pub mod config; // Configuration system with TOML support
pub mod directive;
pub mod error;
pub mod http;
pub mod logging; // Declarative logging system with standard log crate integration
pub mod rbac; // Role-Based Access Control engine

pub mod prelude;

pub use error::{RbacError, RbacResult};
pub use rbac::{Authorizer, Permission, PermissionContext, PermissionService};
