// crates/ingest-bench-core/src/logging.rs
// ============================================================================
// Module: Event Logging
// Description: Structured JSON-line events for adapter and driver activity.
// Purpose: Route diagnostic events without a hard logging dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Adapters emit [`LogEvent`] payloads through an injected [`EventLog`].
//! Sinks write one JSON object per line to stderr or an append-only file, or
//! keep events in memory for assertions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Routine progress.
    Info,
    /// Recovered or skipped failure.
    Warn,
    /// Unrecovered failure.
    Error,
}

/// Structured log event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: LogLevel,
    /// Emitting component label.
    pub component: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Additional structured fields.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl LogEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(level: LogLevel, component: &'static str, event: &'static str, message: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis());
        Self {
            event,
            timestamp_ms,
            level,
            component,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Creates an info event.
    #[must_use]
    pub fn info(component: &'static str, event: &'static str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, component, event, message)
    }

    /// Creates a warning event.
    #[must_use]
    pub fn warn(component: &'static str, event: &'static str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, component, event, message)
    }

    /// Creates an error event.
    #[must_use]
    pub fn error(component: &'static str, event: &'static str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, component, event, message)
    }

    /// Attaches a structured field.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Event log sink.
pub trait EventLog: Send + Sync {
    /// Records an event.
    fn record(&self, event: &LogEvent);
}

/// Event log that writes JSON lines to stderr.
pub struct StderrEventLog;

impl EventLog for StderrEventLog {
    fn record(&self, event: &LogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Event log that appends JSON lines to a file.
pub struct FileEventLog {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventLog {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventLog for FileEventLog {
    fn record(&self, event: &LogEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Event log that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    /// Recorded events.
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the identifiers of recorded events in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).iter().map(|event| event.event).collect()
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, event: &LogEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

/// No-op event log.
pub struct NoopEventLog;

impl EventLog for NoopEventLog {
    fn record(&self, _event: &LogEvent) {}
}
