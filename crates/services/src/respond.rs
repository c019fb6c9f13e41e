//! Boundary rendering
//!
//! Turns a service result into the wire envelope. This is the last stop
//! before a client: internal errors have already been converted to the
//! generic internal-server exception by `ApiResponse::from_error`, so
//! nothing classified as internal can leak from here.

use relay_errors::{convert, Error, Result};
use relay_types::ApiResponse;
use serde::Serialize;

/// Render a result with the given success status.
#[must_use]
pub fn render<T>(status: u16, result: Result<T>) -> ApiResponse
where
    T: Serialize,
{
    match result {
        Ok(value) => match serde_json::to_value(&value) {
            Ok(data) => ApiResponse::success(status, data),
            Err(err) => ApiResponse::from_error(&Error::from(convert::unknown_from(
                "failed to serialise response body",
                &err,
            ))),
        },
        Err(err) => ApiResponse::from_error(&err),
    }
}

/// 200 envelope.
#[must_use]
pub fn ok<T: Serialize>(result: Result<T>) -> ApiResponse {
    render(200, result)
}

/// 201 envelope, used by create endpoints.
#[must_use]
pub fn created<T: Serialize>(result: Result<T>) -> ApiResponse {
    render(201, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_errors::{Exception, InternalError, ValidationIssue};
    use serde_json::json;

    #[test]
    fn success_uses_the_requested_status() {
        let response = created(Ok(json!({"id": "c-1"})));
        assert!(response.is_success());
        assert_eq!(response.status(), 201);
    }

    #[test]
    fn validation_failure_renders_as_422() {
        let issue = ValidationIssue::new(
            vec!["email_address".into()],
            "required field is missing",
            "required",
            "email_address",
        );
        let result: Result<()> = Err(Exception::validation(vec![issue]).into());
        let wire = serde_json::to_value(ok(result)).unwrap();

        assert_eq!(wire["status"], 422);
        assert_eq!(wire["exception"], "E_VALIDATION");
        assert_eq!(wire["data"][0]["path"][0], "email_address");
    }

    #[test]
    fn internal_failure_renders_as_generic_500() {
        let result: Result<()> = Err(InternalError::database("insert", "deadlock").into());
        let wire = serde_json::to_value(ok(result)).unwrap();

        assert_eq!(wire["status"], 500);
        assert_eq!(wire["message"], "internal server error");
        assert!(wire.get("data").is_none());
    }
}
