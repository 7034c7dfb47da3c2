//! SiteGuard Declarative Logging System
//!
//! Built on the standard `log` crate: configure once, then use `log::info!`,
//! `log::warn!` and friends anywhere. The engine logs context loads, fail-closed
//! lookups and guard denials through this facade.
//!
//! # Example
//!
//! ```rust,no_run
//! use siteguard_core::logging::LoggingConfig;
//!
//! let config = LoggingConfig::production().with_context_field("service", "siteguard");
//! siteguard_core::logging::init_logging(&config).unwrap();
//!
//! log::info!("Permission service ready");
//! ```

pub mod config;
pub mod destinations;
pub mod formatter;

pub use config::{LogLevel, LoggingConfig};
pub use destinations::{LogEntry, LogOutput};
pub use formatter::LogFormat;

use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the SiteGuard logger as the global `log` backend
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(config);
    });
    result
}

fn install(config: &LoggingConfig) -> anyhow::Result<()> {
    log::set_boxed_logger(Box::new(SiteGuardLogger::new(config.clone())))?;
    log::set_max_level(config.level.into());
    Ok(())
}

enum Stream {
    Stdout,
    Stderr,
}

struct Writer {
    stream: Stream,
    format: LogFormat,
}

impl Writer {
    fn write(&self, entry: &LogEntry) {
        let line = self.format.format_entry(entry);
        // Write errors are dropped
        let _ = match self.stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }

    fn flush(&self) {
        let _ = match self.stream {
            Stream::Stdout => std::io::stdout().flush(),
            Stream::Stderr => std::io::stderr().flush(),
        };
    }
}

/// SiteGuard's implementation of the log::Log trait
struct SiteGuardLogger {
    config: LoggingConfig,
    writers: Vec<Writer>,
}

impl SiteGuardLogger {
    fn new(config: LoggingConfig) -> Self {
        let mut writers: Vec<Writer> = config
            .outputs
            .iter()
            .map(|output| match output {
                LogOutput::Stdout { format } => Writer {
                    stream: Stream::Stdout,
                    format: format.clone().unwrap_or_else(|| config.format.clone()),
                },
                LogOutput::Stderr { format } => Writer {
                    stream: Stream::Stderr,
                    format: format.clone().unwrap_or_else(|| config.format.clone()),
                },
            })
            .collect();

        if writers.is_empty() {
            writers.push(Writer { stream: Stream::Stdout, format: config.format.clone() });
        }

        Self { config, writers }
    }
}

impl log::Log for SiteGuardLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        LogLevel::from(metadata.level()) <= self.config.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_log_record(record, &self.config);
        for writer in &self.writers {
            writer.write(&entry);
        }
    }

    fn flush(&self) {
        for writer in &self.writers {
            writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_logger_respects_level() {
        let logger = SiteGuardLogger::new(LoggingConfig::production().with_level(LogLevel::Warn));
        let warn = log::Metadata::builder().level(log::Level::Warn).build();
        let info = log::Metadata::builder().level(log::Level::Info).build();

        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&info));
    }

    #[test]
    fn test_logger_defaults_to_stdout() {
        let mut config = LoggingConfig::default();
        config.outputs.clear();
        let logger = SiteGuardLogger::new(config);
        assert_eq!(logger.writers.len(), 1);
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::development();
        let _ = init_logging(&config);
        // Second call is a no-op
        assert!(init_logging(&config).is_ok());
    }
}
