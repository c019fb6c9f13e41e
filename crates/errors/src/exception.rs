//! User-facing error family
//!
//! Exceptions are the only errors permitted to leave the system toward an
//! HTTP client. Every concrete exception type fixes exactly one HTTP status
//! and one public wire code; neither varies per instance.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

use crate::cause::Cause;
use crate::validation::ValidationIssue;

/// Public exception codes with their fixed HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionCode {
    Validation,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    TooManyRequests,
    InternalServer,
}

impl ExceptionCode {
    /// Wire code rendered in exception response bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "E_VALIDATION",
            Self::BadRequest => "E_BAD_REQUEST",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Forbidden => "E_FORBIDDEN",
            Self::NotFound => "E_NOT_FOUND",
            Self::Conflict => "E_CONFLICT",
            Self::TooManyRequests => "E_TOO_MANY_REQUESTS",
            Self::InternalServer => "E_INTERNAL_SERVER",
        }
    }

    /// HTTP status fixed per exception type.
    #[must_use]
    pub fn status(self) -> u16 {
        match self {
            Self::Validation => 422,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::TooManyRequests => 429,
            Self::InternalServer => 500,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Validation => "ValidationException",
            Self::BadRequest => "BadRequestException",
            Self::Unauthorized => "UnauthorizedException",
            Self::Forbidden => "ForbiddenException",
            Self::NotFound => "NotFoundException",
            Self::Conflict => "ConflictException",
            Self::TooManyRequests => "TooManyRequestsException",
            Self::InternalServer => "InternalServerException",
        }
    }
}

/// User-facing, HTTP-status-bearing classified failure.
#[derive(Clone, Debug)]
pub struct Exception {
    code: ExceptionCode,
    message: Cow<'static, str>,
    data: Option<Value>,
    cause: Option<Box<Cause>>,
}

impl Exception {
    fn new(code: ExceptionCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            cause: None,
        }
    }

    /// Structural validation failure carrying every collected issue.
    ///
    /// Callers hand over the validator's full report; the validator never
    /// produces an empty one, so an empty list here signals a caller bug
    /// upstream rather than anything this constructor can reject.
    #[must_use]
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        let data = serde_json::to_value(&issues).unwrap_or(Value::Null);
        Self::new(ExceptionCode::Validation, "validation failure").with_data(data)
    }

    #[must_use]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ExceptionCode::BadRequest, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ExceptionCode::Unauthorized, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ExceptionCode::Forbidden, message)
    }

    /// Resource lookup miss; `model` and `identifier` feed the data payload
    /// so clients can tell which lookup failed.
    #[must_use]
    pub fn not_found(model: impl Into<String>, identifier: impl Into<String>) -> Self {
        let model = model.into();
        let identifier = identifier.into();
        Self::new(ExceptionCode::NotFound, "resource not found").with_data(serde_json::json!({
            "model": model,
            "identifier": identifier,
        }))
    }

    #[must_use]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ExceptionCode::Conflict, message)
    }

    #[must_use]
    pub fn too_many_requests(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ExceptionCode::TooManyRequests, message)
    }

    /// Generic boundary exception. Internal errors and defects surface as
    /// this, never with their own detail.
    #[must_use]
    pub fn internal_server(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ExceptionCode::InternalServer, message)
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the error that triggered this one.
    #[must_use]
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    #[must_use]
    pub fn code(&self) -> ExceptionCode {
        self.code
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.code.status()
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
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_deref()
    }

    /// Validation issues carried by a `Validation` exception, if any.
    #[must_use]
    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        match (&self.code, &self.data) {
            (ExceptionCode::Validation, Some(data)) => {
                serde_json::from_value(data.clone()).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// `{tag, code, message, data?}` — the exception response body and the
    /// log payload share this shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = serde_json::json!({
            "tag": self.tag(),
            "code": self.code.as_str(),
            "message": self.message.as_ref(),
        });
        if let Some(data) = &self.data {
            body["data"] = data.clone();
        }
        body
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.tag(), self.code.as_str(), self.message)?;
        if self.code == ExceptionCode::Validation {
            for issue in self.validation_issues() {
                write!(f, "\n  - {}: {}", issue.path.join("."), issue.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}
