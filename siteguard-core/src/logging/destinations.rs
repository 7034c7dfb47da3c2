//! Log output destinations and the structured entry they receive

use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use std::collections::BTreeMap;

/// Where logs should be sent
#[derive(Clone, Debug)]
pub enum LogOutput {
    Stdout {
        /// Override the default format for this output
        format: Option<LogFormat>,
    },
    Stderr {
        format: Option<LogFormat>,
    },
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Usually the module path
    pub target: String,
    /// Additional structured fields, kept sorted for stable output
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Source file and line number
    pub location: Option<LogLocation>,
}

#[derive(Debug, Clone)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            message: message.into(),
            target: target.into(),
            fields: BTreeMap::new(),
            location: None,
        }
    }

    /// Create a LogEntry from a standard log::Record
    pub fn from_log_record(record: &log::Record, config: &LoggingConfig) -> Self {
        let mut entry =
            Self::new(record.level().into(), record.args().to_string(), record.target());

        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry.location = Some(LogLocation { file: file.to_string(), line });
        }

        for (key, value) in &config.context_fields {
            entry.fields.insert(key.clone(), serde_json::Value::String(value.clone()));
        }

        entry
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_log_record_carries_context() {
        let config = LoggingConfig::default().with_context_field("service", "siteguard");
        let entry = LogEntry::from_log_record(
            &log::Record::builder()
                .args(format_args!("context loaded"))
                .level(log::Level::Info)
                .target("siteguard_core::rbac")
                .file(Some("service.rs"))
                .line(Some(42))
                .build(),
            &config,
        );
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "context loaded");
        assert_eq!(entry.target, "siteguard_core::rbac");
        assert_eq!(entry.location.as_ref().map(|l| l.line), Some(42));
        assert_eq!(entry.fields.get("service"), Some(&serde_json::json!("siteguard")));
    }
}
