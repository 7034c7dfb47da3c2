//! Configuration system for SiteGuard
//!
//! # Configuration Hierarchy
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder methods on the service and guards) - Highest priority
//! 2. **Environment Variables** (`SG_*`) - Override file config
//! 3. **Config File** (siteguard.toml) - Override defaults
//! 4. **Defaults** - Lowest priority
//!
//! # Example
//!
//! ```no_run
//! use siteguard_core::config::SiteGuardConfig;
//!
//! let config = SiteGuardConfig::load()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ```toml
//! [rbac]
//! unauthorized_redirect = "/no-access"
//! lookup_timeout_ms = 2000
//!
//! [rbac.roles]
//! observer = ["project:read", "task:read"]
//!
//! [logging]
//! level = "debug"
//! format = "human"
//! ```

pub mod logging;
pub mod rbac;

pub use logging::LoggingConfig;
pub use rbac::RbacConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "siteguard.toml";

/// Complete SiteGuard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteGuardConfig {
    pub rbac: RbacConfig,
    pub logging: LoggingConfig,
}

impl SiteGuardConfig {
    /// Load configuration with full supersedence chain
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file (a missing file means defaults)
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.rbac.merge(other.rbac);
        self.logging.merge(other.logging);
    }

    pub fn apply_env_vars(&mut self) {
        self.rbac.apply_env_vars();
        self.logging.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.rbac.validate().context("Invalid [rbac] section")?;
        self.logging.validate().context("Invalid [logging] section")?;
        Ok(())
    }
}
