//! Telemetry-coupled error logger
//!
//! Invoked by the managed runtime exactly once per terminal failure. The
//! runtime converts defects into classified errors first, so the logger only
//! ever sees taxonomy values. Logging is best-effort: nothing in here may
//! fail the computation being logged.

use std::sync::Arc;

use relay_errors::{Error, ErrorKind, InternalCode};
use serde_json::json;

use crate::record::{LogLevel, LogRecord};
use crate::sink::TelemetrySink;

/// Categories the logger can be restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// System-internal classified failures.
    Internal,
    /// User-facing classified failures.
    Exception,
    /// Failures originating in framework plumbing (runtime exits,
    /// cancellations, unavailable context).
    FrameworkException,
    /// Failures nobody classified further (the unknown-internal wrapper).
    Unknown,
    /// Everything.
    All,
}

impl ErrorCategory {
    /// Parse a configured category name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "internal" => Some(Self::Internal),
            "exception" => Some(Self::Exception),
            "framework_exception" => Some(Self::FrameworkException),
            "unknown" => Some(Self::Unknown),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Parse a configured allow-list, skipping names that do not parse
    /// (configuration validation rejects them before this point).
    #[must_use]
    pub fn from_names(names: &[String]) -> Vec<Self> {
        names.iter().filter_map(|n| Self::from_name(n)).collect()
    }
}

fn categorise(error: &Error) -> ErrorCategory {
    match error {
        Error::Internal(internal) => match internal.code() {
            InternalCode::Unknown => ErrorCategory::Unknown,
            InternalCode::RuntimeExit
            | InternalCode::Cancelled
            | InternalCode::ContextUnavailable => ErrorCategory::FrameworkException,
            _ => ErrorCategory::Internal,
        },
        Error::Exception(_) => ErrorCategory::Exception,
    }
}

/// Logs terminal failures to a [`TelemetrySink`], filtered by an allow-list
/// of categories.
#[derive(Clone)]
pub struct ErrorLogger {
    sink: Arc<dyn TelemetrySink>,
    min_level: LogLevel,
}

impl ErrorLogger {
    #[must_use]
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            sink,
            min_level: LogLevel::Trace,
        }
    }

    /// Drop records below `level`.
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Log one terminal failure under `span_label` if its category is in
    /// `allowed`. Never fails; sink errors are swallowed.
    pub fn log(&self, allowed: &[ErrorCategory], span_label: &str, error: &Error) {
        let category = categorise(error);
        let pass = allowed
            .iter()
            .any(|c| *c == ErrorCategory::All || *c == category);
        if !pass {
            return;
        }

        let mut payload = error.to_json();
        if let Some(cause) = error.cause() {
            payload["cause"] = cause.to_json();
            payload["root_cause"] = cause.root().to_json();
        }
        let level = match error.kind() {
            ErrorKind::Internal => LogLevel::Error,
            ErrorKind::Exception => LogLevel::Warn,
        };
        if level < self.min_level {
            return;
        }

        self.sink.span_start(span_label);
        self.sink.log(LogRecord::new(
            level,
            span_label,
            error.to_string(),
            json!({ "error": payload }),
        ));
        self.sink.span_end(span_label);
    }
}
