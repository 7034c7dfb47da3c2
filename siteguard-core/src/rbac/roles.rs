//! Role vocabularies
//!
//! Three closed enumerations live here:
//! - [`BusinessRole`]: capability bundles the engine reasons about
//! - [`MembershipRole`]: raw role tags stored on project membership rows
//! - [`OrgRole`]: organization membership roles, used for ownership
//!
//! Raw tags are translated with an exhaustive `match`. Unrecognized tags are
//! kept as [`MembershipRole::Unrecognized`] and handled by an explicit arm.

use crate::error::RbacError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Business role inside a project, ordered from most to least privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum BusinessRole {
    ProjectManager,
    ProjectEngineer,
    QualityInspector,
    SiteSupervisor,
    Collaborator,
    Observer,
}

impl BusinessRole {
    /// Every business role, most privileged first
    pub const ALL: &'static [BusinessRole] = &[
        BusinessRole::ProjectManager,
        BusinessRole::ProjectEngineer,
        BusinessRole::QualityInspector,
        BusinessRole::SiteSupervisor,
        BusinessRole::Collaborator,
        BusinessRole::Observer,
    ];

    /// Role given to project owners
    pub const HIGHEST: BusinessRole = BusinessRole::ProjectManager;

    /// Fallback for membership tags the engine does not recognize
    pub const LEAST_PRIVILEGED: BusinessRole = BusinessRole::Observer;

    pub fn identifier(&self) -> &'static str {
        match self {
            Self::ProjectManager => "project_manager",
            Self::ProjectEngineer => "project_engineer",
            Self::QualityInspector => "quality_inspector",
            Self::SiteSupervisor => "site_supervisor",
            Self::Collaborator => "collaborator",
            Self::Observer => "observer",
        }
    }
}

impl fmt::Display for BusinessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for BusinessRole {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BusinessRole::ALL
            .iter()
            .copied()
            .find(|r| r.identifier() == wanted)
            .ok_or_else(|| RbacError::UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for BusinessRole {
    type Error = RbacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BusinessRole> for &'static str {
    fn from(role: BusinessRole) -> Self {
        role.identifier()
    }
}

/// Raw role tag carried by a project membership row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MembershipRole {
    Owner,
    Admin,
    Manager,
    Engineer,
    Inspector,
    Supervisor,
    Member,
    External,
    Viewer,
    /// Tag not known to this engine, kept verbatim for logging
    Unrecognized(String),
}

impl MembershipRole {
    /// Parse a stored tag; never fails
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "owner" => Self::Owner,
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "engineer" => Self::Engineer,
            "inspector" => Self::Inspector,
            "supervisor" => Self::Supervisor,
            "member" => Self::Member,
            "external" => Self::External,
            "viewer" => Self::Viewer,
            _ => Self::Unrecognized(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Engineer => "engineer",
            Self::Inspector => "inspector",
            Self::Supervisor => "supervisor",
            Self::Member => "member",
            Self::External => "external",
            Self::Viewer => "viewer",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Business roles granted by this membership tag
    pub fn business_roles(&self) -> Vec<BusinessRole> {
        match self {
            Self::Owner | Self::Admin | Self::Manager => vec![BusinessRole::ProjectManager],
            Self::Engineer => vec![BusinessRole::ProjectEngineer],
            Self::Inspector => vec![BusinessRole::QualityInspector, BusinessRole::Observer],
            Self::Supervisor => vec![BusinessRole::SiteSupervisor],
            Self::Member | Self::External => vec![BusinessRole::Collaborator],
            Self::Viewer => vec![BusinessRole::Observer],
            Self::Unrecognized(tag) => {
                log::warn!(
                    "Unrecognized membership role '{}', falling back to {}",
                    tag,
                    BusinessRole::LEAST_PRIVILEGED
                );
                vec![BusinessRole::LEAST_PRIVILEGED]
            }
        }
    }
}

impl From<String> for MembershipRole {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for MembershipRole {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<MembershipRole> for String {
    fn from(role: MembershipRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role held inside an organization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrgRole {
    Owner,
    Admin,
    Member,
    Unrecognized(String),
}

impl OrgRole {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "owner" => Self::Owner,
            "admin" => Self::Admin,
            "member" => Self::Member,
            _ => Self::Unrecognized(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Only the organization's highest administrative role confers project ownership
    pub fn is_highest(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl From<String> for OrgRole {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for OrgRole {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<OrgRole> for String {
    fn from(role: OrgRole) -> Self {
        role.as_str().to_string()
    }
}
