//! Log formatting options for different output styles

use crate::logging::destinations::LogEntry;

/// How logs should be formatted
#[derive(Clone, Debug, PartialEq)]
pub enum LogFormat {
    /// Structured JSON format (production default)
    /// Example: {"timestamp":"2024-01-15T10:30:00Z","level":"INFO","message":"Permission context loaded"}
    Json,

    /// Human-readable format (development default)
    /// Example: 2024-01-15 10:30:00.000 INFO  [siteguard_core::rbac] Permission context loaded
    Human,

    /// Logfmt format (key=value pairs)
    Logfmt,
}

impl LogFormat {
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json => format_json(entry),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
        }
    }
}

fn level_str(entry: &LogEntry) -> String {
    format!("{:?}", entry.level).to_uppercase()
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = serde_json::Map::new();

    json.insert("timestamp".to_string(), entry.timestamp.to_rfc3339().into());
    json.insert("level".to_string(), level_str(entry).into());
    json.insert("message".to_string(), entry.message.clone().into());
    json.insert("target".to_string(), entry.target.clone().into());

    if let Some(location) = &entry.location {
        json.insert("file".to_string(), location.file.clone().into());
        json.insert("line".to_string(), location.line.into());
    }

    for (key, value) in &entry.fields {
        json.insert(key.clone(), value.clone());
    }

    serde_json::to_string(&json).unwrap_or_else(|_| "Failed to serialize log entry".to_string())
}

fn plain_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

fn format_human(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
    let mut message =
        format!("{} {:5} [{}] {}", timestamp, level_str(entry), entry.target, entry.message);

    for (key, value) in &entry.fields {
        message.push_str(&format!(" {}={}", key, plain_value(value)));
    }

    message
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = vec![
        format!("timestamp={}", entry.timestamp.to_rfc3339()),
        format!("level={}", level_str(entry)),
        format!("target={}", entry.target),
        format!("message=\"{}\"", entry.message.replace('"', "\\\"")),
    ];

    for (key, value) in &entry.fields {
        let value = plain_value(value);
        if value.contains(' ') {
            parts.push(format!("{}=\"{}\"", key, value.replace('"', "\\\"")));
        } else {
            parts.push(format!("{}={}", key, value));
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    fn entry() -> LogEntry {
        LogEntry::new(LogLevel::Warn, "lookup \"membership\" failed", "siteguard_core::rbac")
            .with_field("project", "tower")
    }

    #[test]
    fn test_json_format() {
        let line = LogFormat::Json.format_entry(&entry());
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["message"], "lookup \"membership\" failed");
        assert_eq!(parsed["project"], "tower");
    }

    #[test]
    fn test_human_format() {
        let line = LogFormat::Human.format_entry(&entry());
        assert!(line.contains("WARN  [siteguard_core::rbac]"));
        assert!(line.ends_with("project=tower"));
    }

    #[test]
    fn test_logfmt_escapes_quotes() {
        let line = LogFormat::Logfmt.format_entry(&entry());
        assert!(line.contains(r#"message="lookup \"membership\" failed""#));
        assert!(line.contains("project=tower"));
    }
}
