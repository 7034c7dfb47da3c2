//! RBAC configuration

use crate::error::{RbacError, RbacResult};
use crate::http::DEFAULT_UNAUTHORIZED_PATH;
use crate::rbac::RolePermissionTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// Where guards send denied navigation
    pub unauthorized_redirect: String,
    /// Log every guard denial
    pub audit_enabled: bool,
    /// Upper bound for each collaborator lookup (None = collaborator decides)
    pub lookup_timeout_ms: Option<u64>,
    /// Business role → permission identifiers, layered over the default table
    pub roles: BTreeMap<String, Vec<String>>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            unauthorized_redirect: DEFAULT_UNAUTHORIZED_PATH.to_string(),
            audit_enabled: true,
            lookup_timeout_ms: None,
            roles: BTreeMap::new(),
        }
    }
}

impl RbacConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        self.apply_vars(|key| env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("SG_RBAC_UNAUTHORIZED_REDIRECT") {
            self.unauthorized_redirect = path;
        }
        if let Some(audit) = var("SG_RBAC_AUDIT_ENABLED") {
            match audit.parse() {
                Ok(enabled) => self.audit_enabled = enabled,
                Err(_) => log::warn!("Ignoring invalid SG_RBAC_AUDIT_ENABLED={}", audit),
            }
        }
        if let Some(timeout) = var("SG_RBAC_LOOKUP_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(ms) => self.lookup_timeout_ms = Some(ms),
                Err(_) => log::warn!("Ignoring invalid SG_RBAC_LOOKUP_TIMEOUT_MS={}", timeout),
            }
        }
    }

    pub fn validate(&self) -> RbacResult<()> {
        if !self.unauthorized_redirect.starts_with('/') {
            return Err(RbacError::Config(format!(
                "unauthorized_redirect must be an absolute path, got '{}'",
                self.unauthorized_redirect
            )));
        }
        if self.lookup_timeout_ms == Some(0) {
            return Err(RbacError::Config("lookup_timeout_ms must be greater than 0".into()));
        }
        self.role_table().map(|_| ())
    }

    /// Role table with configured overrides applied
    pub fn role_table(&self) -> RbacResult<RolePermissionTable> {
        RolePermissionTable::from_definitions(&self.roles)
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RbacConfig::default();
        assert_eq!(config.unauthorized_redirect, "/unauthorized");
        assert!(config.audit_enabled);
        assert_eq!(config.lookup_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let config = RbacConfig { unauthorized_redirect: "denied".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(RbacError::Config(_))));

        let config = RbacConfig { lookup_timeout_ms: Some(0), ..Default::default() };
        assert!(config.validate().is_err());

        let mut config = RbacConfig::default();
        config.roles.insert("observer".into(), vec!["task:juggle".into()]);
        assert!(matches!(config.validate(), Err(RbacError::UnknownPermission(_))));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let vars = |key: &str| match key {
            "SG_RBAC_AUDIT_ENABLED" => Some("sometimes".to_string()),
            "SG_RBAC_LOOKUP_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        };
        let mut config = RbacConfig { audit_enabled: false, ..Default::default() };
        config.apply_vars(vars);
        assert!(!config.audit_enabled);
        assert_eq!(config.lookup_timeout_ms, None);

        config.apply_vars(|key| match key {
            "SG_RBAC_AUDIT_ENABLED" => Some("true".to_string()),
            "SG_RBAC_LOOKUP_TIMEOUT_MS" => Some("750".to_string()),
            _ => None,
        });
        assert!(config.audit_enabled);
        assert_eq!(config.lookup_timeout(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RbacConfig = toml::from_str(
            r#"
            lookup_timeout_ms = 1500

            [roles]
            collaborator = ["project:read", "task:read"]
            "#,
        )
        .unwrap();

        assert_eq!(config.lookup_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.unauthorized_redirect, "/unauthorized");
        assert_eq!(config.roles["collaborator"].len(), 2);
    }
}
