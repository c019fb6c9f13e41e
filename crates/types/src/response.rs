//! Response envelope
//!
//! The boundary serialises every outcome into one of two stable shapes:
//!
//! ```json
//! {"type": "success",   "status": 200, "message": null, "data": {...}, "metadata": {}}
//! {"type": "exception", "status": 422, "message": "...", "exception": "E_VALIDATION",
//!  "data": [...], "metadata": {}}
//! ```
//!
//! Only [`Exception`] values render as exceptions; an [`InternalError`] is
//! converted to the generic internal-server exception first, so internal
//! detail never reaches a client.
//!
//! [`Exception`]: relay_errors::Exception
//! [`InternalError`]: relay_errors::InternalError

use relay_errors::{convert, Error, Exception};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiResponse {
    Success {
        status: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(default)]
        metadata: Value,
    },
    Exception {
        status: u16,
        message: String,
        exception: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(default)]
        metadata: Value,
    },
}

fn empty_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ApiResponse {
    /// 200 with a data payload.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::success(200, data)
    }

    /// 201 with a data payload.
    #[must_use]
    pub fn created(data: Value) -> Self {
        Self::success(201, data)
    }

    #[must_use]
    pub fn success(status: u16, data: Value) -> Self {
        ApiResponse::Success {
            status,
            message: None,
            data: Some(data),
            metadata: empty_metadata(),
        }
    }

    /// Render an exception into the wire envelope.
    #[must_use]
    pub fn from_exception(exception: &Exception) -> Self {
        ApiResponse::Exception {
            status: exception.status(),
            message: exception.message().to_string(),
            exception: exception.code().as_str().to_string(),
            data: exception.data().cloned(),
            metadata: empty_metadata(),
        }
    }

    /// Render any classified error. Internal errors pass through the
    /// boundary conversion and come out as the generic 500 shape.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        Self::from_exception(&convert::to_exception(error.clone()))
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiResponse::Success { status, .. } | ApiResponse::Exception { status, .. } => *status,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }
}
