//! System-internal error family
//!
//! Internal errors describe states the system should never reach: decode
//! failures after validation passed, missing ambient context, unclassified
//! runtime exits. Their codes are stable for logging and analytics but are
//! never rendered verbatim to an end user; the boundary converts every
//! internal error into a generic internal-server exception first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

use crate::cause::Cause;
use crate::validation::SchemaIssue;

/// Fixed internal error codes. Stable across releases; new variants may be
/// appended but existing wire strings never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalCode {
    Unknown,
    SchemaDecode,
    PayloadNotValidated,
    ContextUnavailable,
    RuntimeExit,
    Database,
    Cancelled,
    InvalidRuleSet,
    Config,
}

impl InternalCode {
    /// Stable identifier used in logs and structured reporting.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "I_UNKNOWN",
            Self::SchemaDecode => "I_SCHEMA_DECODE",
            Self::PayloadNotValidated => "I_PAYLOAD_NOT_VALIDATED",
            Self::ContextUnavailable => "I_CONTEXT_UNAVAILABLE",
            Self::RuntimeExit => "I_RUNTIME_EXIT",
            Self::Database => "I_DATABASE",
            Self::Cancelled => "I_CANCELLED",
            Self::InvalidRuleSet => "I_INVALID_RULE_SET",
            Self::Config => "I_CONFIG",
        }
    }

    /// Tag identifying the concrete error type, used for typed recovery.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Unknown => "UnknownError",
            Self::SchemaDecode => "SchemaError",
            Self::PayloadNotValidated => "DataPayloadNotValidatedError",
            Self::ContextUnavailable => "ContextUnavailableError",
            Self::RuntimeExit => "RuntimeExitError",
            Self::Database => "DatabaseError",
            Self::Cancelled => "CancelledError",
            Self::InvalidRuleSet => "InvalidRuleSetError",
            Self::Config => "ConfigError",
        }
    }
}

/// Structured data specific to a concrete internal error type.
///
/// Each variant belongs to exactly one [`InternalCode`]; the constructors on
/// [`InternalError`] enforce the pairing, and codes whose data is mandatory
/// cannot be constructed without it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum InternalData {
    SchemaDecode {
        issues: Vec<SchemaIssue>,
        input: Value,
    },
    PayloadNotValidated {
        stage: String,
    },
    ContextUnavailable {
        requested: String,
    },
    RuntimeExit {
        exit: String,
    },
    Database {
        operation: String,
    },
    InvalidRuleSet {
        rule: String,
        field: String,
        reason: String,
    },
}

/// System-internal classified failure.
///
/// Immutable after construction except for [`InternalError::with_detail`],
/// the single controlled patch used to backfill derived diagnostic text.
#[derive(Clone, Debug)]
pub struct InternalError {
    code: InternalCode,
    message: Cow<'static, str>,
    detail: Option<String>,
    data: Option<InternalData>,
    cause: Option<Box<Cause>>,
}

impl InternalError {
    fn new(code: InternalCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
            data: None,
            cause: None,
        }
    }

    /// Generic wrapper for a failure the taxonomy does not recognise.
    #[must_use]
    pub fn unknown(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(InternalCode::Unknown, message)
    }

    /// Decode failure against a strict schema. The issue list and the
    /// (already redacted) offending input are mandatory.
    #[must_use]
    pub fn schema_decode(issues: Vec<SchemaIssue>, input: Value) -> Self {
        Self::new(InternalCode::SchemaDecode, "schema decode failed")
            .with_data(InternalData::SchemaDecode { issues, input })
    }

    /// The decoded value of a payload was requested before the pipeline
    /// reached the decoded stage.
    #[must_use]
    pub fn payload_not_validated(stage: impl Into<String>) -> Self {
        Self::new(
            InternalCode::PayloadNotValidated,
            "data payload accessed before validation completed",
        )
        .with_data(InternalData::PayloadNotValidated {
            stage: stage.into(),
        })
    }

    /// Ambient context was requested outside any request scope.
    #[must_use]
    pub fn context_unavailable(requested: impl Into<String>) -> Self {
        Self::new(
            InternalCode::ContextUnavailable,
            "ambient context unavailable outside a managed computation",
        )
        .with_data(InternalData::ContextUnavailable {
            requested: requested.into(),
        })
    }

    /// The runtime observed an exit shape that is neither a clean success
    /// nor a classified failure.
    #[must_use]
    pub fn runtime_exit(exit: impl Into<String>) -> Self {
        Self::new(InternalCode::RuntimeExit, "unclassified runtime exit").with_data(
            InternalData::RuntimeExit {
                exit: exit.into(),
            },
        )
    }

    /// Persistence-layer failure, with the operation that was attempted.
    #[must_use]
    pub fn database(operation: impl Into<String>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(InternalCode::Database, message).with_data(InternalData::Database {
            operation: operation.into(),
        })
    }

    /// The computation was interrupted by an external cancellation signal.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(InternalCode::Cancelled, "computation cancelled")
    }

    /// Boot configuration could not be read or failed its invariants.
    #[must_use]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(InternalCode::Config, message)
    }

    /// A declarative rule set is malformed (a programming error caught at
    /// ruleset compilation, not at request time).
    #[must_use]
    pub fn invalid_rule_set(
        rule: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(InternalCode::InvalidRuleSet, "invalid validation rule set").with_data(
            InternalData::InvalidRuleSet {
                rule: rule.into(),
                field: field.into(),
                reason: reason.into(),
            },
        )
    }

    fn with_data(mut self, data: InternalData) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the error that triggered this one.
    #[must_use]
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Backfill derived diagnostic text after construction. This is the only
    /// mutation the type permits; it must happen before the error crosses a
    /// module boundary.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn code(&self) -> InternalCode {
        self.code
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.code.tag()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn data(&self) -> Option<&InternalData> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_deref()
    }

    /// `{tag, code, message, data?}` for log payloads.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = serde_json::json!({
            "tag": self.tag(),
            "code": self.code.as_str(),
            "message": self.message.as_ref(),
        });
        if let Some(data) = &self.data {
            if let Ok(value) = serde_json::to_value(data) {
                body["data"] = value;
            }
        }
        body
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.tag(), self.code.as_str(), self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl std::error::Error for InternalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_tag_code_and_message() {
        let err = InternalError::unknown("something broke");
        assert_eq!(err.to_string(), "UnknownError [I_UNKNOWN]: something broke");
    }

    #[test]
    fn detail_patch_is_appended() {
        let err = InternalError::cancelled().with_detail("client disconnect");
        assert_eq!(
            err.to_string(),
            "CancelledError [I_CANCELLED]: computation cancelled (client disconnect)"
        );
    }

    #[test]
    fn schema_decode_requires_data() {
        let err = InternalError::schema_decode(
            vec![SchemaIssue::new(vec!["email_address".into()], "not an email")],
            serde_json::json!({"email_address": 42}),
        );
        let json = err.to_json();
        assert_eq!(json["code"], "I_SCHEMA_DECODE");
        assert_eq!(json["data"]["issues"][0]["path"][0], "email_address");
    }

    #[test]
    fn codes_have_stable_strings() {
        assert_eq!(InternalCode::Database.as_str(), "I_DATABASE");
        assert_eq!(
            InternalCode::PayloadNotValidated.tag(),
            "DataPayloadNotValidatedError"
        );
    }
}
