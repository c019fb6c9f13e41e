//! Staged payload container
//!
//! The stage is a tagged enum, so a payload is always in exactly one state
//! and the decoded value physically does not exist before decode succeeds.
//! Accessing it early fails with the dedicated `DataPayloadNotValidatedError`
//! rather than returning anything best-effort.

use std::future::Future;

use relay_errors::{Error, Exception, InternalError, Result};
use relay_types::RequestRecord;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decode::decode_value;
use crate::rule::RuleSet;

/// Where a payload's input came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// Constructed by internal, already-trusted code.
    Data,
    /// Constructed from untrusted external input.
    Request,
}

#[derive(Debug)]
enum Stage<T> {
    Raw(Value),
    Validated(Value),
    Mapped(Value),
    Decoded(T),
}

impl<T> Stage<T> {
    fn name(&self) -> &'static str {
        match self {
            Stage::Raw(_) => "raw",
            Stage::Validated(_) => "structurally_validated",
            Stage::Mapped(_) => "semantically_mapped",
            Stage::Decoded(_) => "schema_decoded",
        }
    }
}

/// Container walking raw input through validation, mapping and decode.
#[derive(Debug)]
pub struct DataPayload<T> {
    kind: PayloadKind,
    stage: Stage<T>,
}

impl<T> DataPayload<T>
where
    T: DeserializeOwned,
{
    /// Start a request-kind payload from the merged request record.
    #[must_use]
    pub fn from_request(record: &RequestRecord) -> Self {
        Self {
            kind: PayloadKind::Request,
            stage: Stage::Raw(record.merged()),
        }
    }

    /// Build a data-kind payload from an internally constructed record.
    ///
    /// This is the only data-kind constructor and it schema-decodes
    /// immediately: trusted callers cannot skip the decode, and untrusted
    /// input has no way in here.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` when the record does not decode.
    pub fn from_trusted(record: Value) -> Result<Self> {
        let decoded = decode_value(record, &[])?;
        Ok(Self {
            kind: PayloadKind::Data,
            stage: Stage::Decoded(decoded),
        })
    }

    /// Structural validation, `Raw → StructurallyValidated`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationException` carrying every collected issue, or an
    /// internal error when called out of stage order.
    pub fn validate(self, rules: &RuleSet) -> Result<Self> {
        match self.stage {
            Stage::Raw(record) => match rules.validate(&record) {
                Ok(()) => Ok(Self {
                    kind: self.kind,
                    stage: Stage::Validated(record),
                }),
                Err(issues) => Err(Exception::validation(issues).into()),
            },
            other => Err(stage_misuse("validate", other.name())),
        }
    }

    /// Effectful semantic mapping, `StructurallyValidated →
    /// SemanticallyMapped`. The closure may consult ambient services;
    /// its failure propagates as-is.
    ///
    /// # Errors
    ///
    /// Propagates the mapping closure's error, or an internal error when
    /// called out of stage order.
    pub async fn map_semantics<F, Fut>(self, map: F) -> Result<Self>
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        match self.stage {
            Stage::Validated(record) => {
                let mapped = map(record).await?;
                Ok(Self {
                    kind: self.kind,
                    stage: Stage::Mapped(mapped),
                })
            }
            other => Err(stage_misuse("map_semantics", other.name())),
        }
    }

    /// Schema decode into the typed domain value. Runs from the mapped
    /// record, or directly from the validated record when no semantic
    /// mapping was needed.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` on decode failure (with `redact_keys` elided
    /// from the captured input), or `DataPayloadNotValidatedError` when the
    /// payload is still raw.
    pub fn decode(self, redact_keys: &[String]) -> Result<Self> {
        match self.stage {
            Stage::Validated(record) | Stage::Mapped(record) => {
                let decoded = decode_value(record, redact_keys)?;
                Ok(Self {
                    kind: self.kind,
                    stage: Stage::Decoded(decoded),
                })
            }
            Stage::Raw(_) => Err(InternalError::payload_not_validated("raw").into()),
            other @ Stage::Decoded(_) => Err(stage_misuse("decode", other.name())),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Current stage name, for diagnostics.
    #[must_use]
    pub fn stage_name(&self) -> &'static str {
        self.stage.name()
    }

    /// Borrow the decoded value.
    ///
    /// # Errors
    ///
    /// Returns `DataPayloadNotValidatedError` unless decode has completed.
    pub fn decoded(&self) -> Result<&T> {
        match &self.stage {
            Stage::Decoded(value) => Ok(value),
            other => Err(InternalError::payload_not_validated(other.name()).into()),
        }
    }

    /// Take the decoded value.
    ///
    /// # Errors
    ///
    /// Returns `DataPayloadNotValidatedError` unless decode has completed.
    pub fn into_decoded(self) -> Result<T> {
        match self.stage {
            Stage::Decoded(value) => Ok(value),
            other => Err(InternalError::payload_not_validated(other.name()).into()),
        }
    }
}

fn stage_misuse(operation: &str, stage: &str) -> Error {
    InternalError::unknown(format!(
        "payload operation {operation} called in stage {stage}"
    ))
    .into()
}
