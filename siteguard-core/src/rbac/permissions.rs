//! Permission catalogue for construction projects
//!
//! Permissions are atomic, checkable capabilities identified as
//! `resource:action` (e.g. `task:create`). The catalogue is closed: an
//! identifier that does not parse is rejected at configuration time.

use crate::error::RbacError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A checkable capability inside a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Permission {
    ProjectRead,
    ProjectUpdate,
    ProjectDelete,
    MemberRead,
    MemberManage,
    TaskRead,
    TaskCreate,
    TaskUpdate,
    TaskDelete,
    BlueprintRead,
    BlueprintUpload,
    BlueprintDelete,
    InspectionRead,
    InspectionCreate,
    InspectionApprove,
    FileRead,
    FileUpload,
    FileDelete,
    AcceptanceRead,
    AcceptanceCreate,
    AcceptanceApprove,
    ProblemRead,
    ProblemCreate,
    ProblemResolve,
}

impl Permission {
    /// Every permission in the catalogue
    pub const ALL: &'static [Permission] = &[
        Permission::ProjectRead,
        Permission::ProjectUpdate,
        Permission::ProjectDelete,
        Permission::MemberRead,
        Permission::MemberManage,
        Permission::TaskRead,
        Permission::TaskCreate,
        Permission::TaskUpdate,
        Permission::TaskDelete,
        Permission::BlueprintRead,
        Permission::BlueprintUpload,
        Permission::BlueprintDelete,
        Permission::InspectionRead,
        Permission::InspectionCreate,
        Permission::InspectionApprove,
        Permission::FileRead,
        Permission::FileUpload,
        Permission::FileDelete,
        Permission::AcceptanceRead,
        Permission::AcceptanceCreate,
        Permission::AcceptanceApprove,
        Permission::ProblemRead,
        Permission::ProblemCreate,
        Permission::ProblemResolve,
    ];

    /// Stable identifier (e.g. "task:create")
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::ProjectRead => "project:read",
            Self::ProjectUpdate => "project:update",
            Self::ProjectDelete => "project:delete",
            Self::MemberRead => "member:read",
            Self::MemberManage => "member:manage",
            Self::TaskRead => "task:read",
            Self::TaskCreate => "task:create",
            Self::TaskUpdate => "task:update",
            Self::TaskDelete => "task:delete",
            Self::BlueprintRead => "blueprint:read",
            Self::BlueprintUpload => "blueprint:upload",
            Self::BlueprintDelete => "blueprint:delete",
            Self::InspectionRead => "inspection:read",
            Self::InspectionCreate => "inspection:create",
            Self::InspectionApprove => "inspection:approve",
            Self::FileRead => "file:read",
            Self::FileUpload => "file:upload",
            Self::FileDelete => "file:delete",
            Self::AcceptanceRead => "acceptance:read",
            Self::AcceptanceCreate => "acceptance:create",
            Self::AcceptanceApprove => "acceptance:approve",
            Self::ProblemRead => "problem:read",
            Self::ProblemCreate => "problem:create",
            Self::ProblemResolve => "problem:resolve",
        }
    }

    /// Resource part of the identifier ("task" for "task:create")
    pub fn resource(&self) -> &'static str {
        self.identifier().split(':').next().unwrap_or_default()
    }

    /// Action part of the identifier ("create" for "task:create")
    pub fn action(&self) -> &'static str {
        self.identifier().split(':').nth(1).unwrap_or_default()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Permission {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.identifier() == wanted)
            .ok_or_else(|| RbacError::UnknownPermission(s.to_string()))
    }
}

impl TryFrom<String> for Permission {
    type Error = RbacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for &'static str {
    fn from(permission: Permission) -> Self {
        permission.identifier()
    }
}

/// How a list of requirements combines
///
/// `Any` over an empty list is never satisfied and `All` over an empty list
/// always is. A caller wanting "always allow" installs no requirement at all
/// rather than an empty `Any` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequireMode {
    /// Every listed item is required
    #[default]
    All,
    /// At least one listed item is required
    Any,
}
