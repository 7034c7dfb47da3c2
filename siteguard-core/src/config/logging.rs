//! Logging configuration

use crate::logging::{LogFormat, LogLevel};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// error, warn, info, debug or trace
    pub level: String,
    /// json, human or logfmt
    pub format: String,
    /// Write to stderr instead of stdout
    pub stderr: bool,
    /// Fields added to every entry (e.g. service = "siteguard")
    pub context_fields: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            stderr: false,
            context_fields: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("SG_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("SG_LOG_FORMAT") {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.log_level()?;
        self.log_format()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel> {
        Ok(match self.level.to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            other => bail!("Unknown log level '{}'", other),
        })
    }

    pub fn log_format(&self) -> Result<LogFormat> {
        Ok(match self.format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "human" => LogFormat::Human,
            "logfmt" => LogFormat::Logfmt,
            other => bail!("Unknown log format '{}'", other),
        })
    }

    /// Build the runtime logger configuration
    pub fn to_logging_config(&self) -> Result<crate::logging::LoggingConfig> {
        let format = self.log_format()?;
        let mut config = crate::logging::LoggingConfig::default()
            .with_level(self.log_level()?)
            .with_format(format.clone());
        config.outputs.clear();
        config = if self.stderr { config.with_stderr(format) } else { config.with_stdout(format) };
        for (key, value) in &self.context_fields {
            config = config.with_context_field(key, value);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogOutput;

    #[test]
    fn test_conversion() {
        let mut section = LoggingConfig { level: "DEBUG".into(), stderr: true, ..Default::default() };
        section.context_fields.insert("service".into(), "siteguard".into());

        let config = section.to_logging_config().unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(matches!(config.outputs.as_slice(), [LogOutput::Stderr { .. }]));
        assert_eq!(config.context_fields.get("service").map(String::as_str), Some("siteguard"));
    }

    #[test]
    fn test_rejects_unknown_values() {
        let section = LoggingConfig { level: "loud".into(), ..Default::default() };
        assert!(section.validate().is_err());

        let section = LoggingConfig { format: "xml".into(), ..Default::default() };
        assert!(section.validate().is_err());
    }
}
