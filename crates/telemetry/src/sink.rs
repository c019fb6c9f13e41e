//! Telemetry sink contract and the built-in sinks

use std::sync::{Arc, Mutex};

use crate::record::{LogLevel, LogRecord};

/// Where telemetry goes. Implementations must not panic; the logger treats
/// every sink as best-effort.
pub trait TelemetrySink: Send + Sync {
    /// Mark the start of a labelled span.
    fn span_start(&self, label: &str);

    /// Mark the end of a labelled span.
    fn span_end(&self, label: &str);

    /// Emit one structured record.
    fn log(&self, record: LogRecord);
}

/// Default sink: forwards to the `tracing` ecosystem.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl TracingSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for TracingSink {
    fn span_start(&self, label: &str) {
        tracing::trace!(span = label, "span start");
    }

    fn span_end(&self, label: &str) {
        tracing::trace!(span = label, "span end");
    }

    fn log(&self, record: LogRecord) {
        // tracing macros need a const level, so dispatch explicitly.
        let payload = record.payload.to_string();
        match record.level {
            LogLevel::Trace => {
                tracing::trace!(span = %record.span, payload = %payload, "{}", record.message);
            }
            LogLevel::Debug => {
                tracing::debug!(span = %record.span, payload = %payload, "{}", record.message);
            }
            LogLevel::Info => {
                tracing::info!(span = %record.span, payload = %payload, "{}", record.message);
            }
            LogLevel::Warn => {
                tracing::warn!(span = %record.span, payload = %payload, "{}", record.message);
            }
            LogLevel::Error => {
                tracing::error!(span = %record.span, payload = %payload, "{}", record.message);
            }
        }
    }
}

/// In-memory sink for tests and local inspection.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
    spans: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Span labels in `start`/`end` order, e.g. `["+request", "-request"]`.
    #[must_use]
    pub fn span_trace(&self) -> Vec<String> {
        self.spans.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| r.level == LogLevel::Error)
            .count()
    }
}

impl TelemetrySink for MemorySink {
    fn span_start(&self, label: &str) {
        if let Ok(mut spans) = self.spans.lock() {
            spans.push(format!("+{label}"));
        }
    }

    fn span_end(&self, label: &str) {
        if let Ok(mut spans) = self.spans.lock() {
            spans.push(format!("-{label}"));
        }
    }

    fn log(&self, record: LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.span_start("request");
        sink.log(LogRecord::new(LogLevel::Error, "request", "one", Value::Null));
        sink.log(LogRecord::new(LogLevel::Info, "request", "two", Value::Null));
        sink.span_end("request");

        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.span_trace(), vec!["+request", "-request"]);
        let messages: Vec<_> = sink.records().iter().map(|r| r.message.clone()).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }
}
