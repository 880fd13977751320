//! Host log forwarding.
//!
//! The core logs through `tracing`. A host that wants those events in its own
//! pipeline (a JS callback, a telemetry buffer) implements [`LoggerSink`] and
//! hands it to `core_runtime::logging::init_logging`. Every entry arrives
//! with device identifiers already shortened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{
    error::{BridgeError, Result},
    platform::PlatformSendSync,
};

/// Severity of a forwarded entry. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = BridgeError;

    /// Case-insensitive; `warning` is accepted for `warn`.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(BridgeError::OperationFailed(format!(
                "unknown log level: {other}"
            ))),
        }
    }
}

/// One `tracing` event, flattened for a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path of the emitting code, e.g. `core_output::session`.
    pub target: String,
    pub message: String,
    /// Structured fields in key order (`engine_id`, `routing`, `device_id`...).
    pub fields: BTreeMap<String, String>,
    /// Name of the innermost span, e.g. `create` or `set_output_device`.
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// Value of a structured field, if the event carried it.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Receiver for forwarded log entries.
///
/// `log` is called off the emitting call path (spawned on the current
/// executor), so a slow sink never stalls audio control calls. Returned
/// errors go to stderr on native targets and are dropped on wasm.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
///
/// struct Telemetry;
///
/// #[async_trait::async_trait]
/// impl LoggerSink for Telemetry {
///     async fn log(&self, entry: LogEntry) -> bridge_traits::error::Result<()> {
///         if entry.field("routing") == Some("relayed") { /* ... */ }
///         Ok(())
///     }
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LoggerSink: PlatformSendSync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Entries below this level are dropped before they are built.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn entry_serializes_for_hosts() {
        let entry = LogEntry::new(LogLevel::Warn, "core_output::watchdog", "autoplay blocked")
            .with_field("routing", "relayed")
            .with_span("ensure_audio_element_playing");

        assert_eq!(entry.field("routing"), Some("relayed"));
        assert_eq!(entry.field("device_id"), None);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "warn");
        assert_eq!(json["span"], "ensure_audio_element_playing");
        assert_eq!(json["fields"]["routing"], "relayed");
        assert!(json["timestamp"].is_string());
    }
}
