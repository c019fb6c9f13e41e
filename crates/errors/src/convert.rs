//! Boundary conversion
//!
//! Converts arbitrary failures into the taxonomy. Both conversions are
//! idempotent: re-converting a value already in the target family returns it
//! unchanged, so nested boundaries never double-wrap.

use crate::cause::Cause;
use crate::exception::Exception;
use crate::internal::InternalError;
use crate::Error;

/// Wrap any foreign error as a generic unknown internal error, preserving
/// the original as the cause.
#[must_use]
pub fn unknown_from<E>(message: &'static str, err: &E) -> InternalError
where
    E: std::error::Error,
{
    InternalError::unknown(message).with_cause(Cause::from_std(err))
}

/// Convert a classified error into an internal error.
///
/// Internal errors pass through unchanged; exceptions are wrapped with
/// self-as-cause so their identity survives.
#[must_use]
pub fn to_unknown_error(message: &'static str, err: Error) -> InternalError {
    match err {
        Error::Internal(internal) => internal,
        Error::Exception(_) => {
            let cause = err.infer_cause();
            InternalError::unknown(message).with_cause(cause)
        }
    }
}

/// Convert a classified error into the exception surfaced at the system
/// boundary.
///
/// Exceptions pass through unchanged (idempotent). Internal errors become a
/// generic internal-server exception whose cause is the internal error, so
/// full detail reaches the logs while the client sees only the generic
/// shape.
#[must_use]
pub fn to_exception(err: Error) -> Exception {
    match err {
        Error::Exception(exception) => exception,
        Error::Internal(_) => {
            let cause = err.infer_cause();
            Exception::internal_server("internal server error").with_cause(cause)
        }
    }
}

/// Classify a foreign error directly into the boundary exception.
#[must_use]
pub fn exception_from<E>(err: &E) -> Exception
where
    E: std::error::Error,
{
    to_exception(Error::Internal(unknown_from("unexpected error", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ExceptionCode;
    use crate::internal::InternalCode;

    #[test]
    fn to_exception_is_idempotent() {
        let original = Exception::conflict("email already registered");
        let once = to_exception(Error::Exception(original.clone()));
        let twice = to_exception(Error::Exception(once.clone()));

        assert_eq!(twice.code(), original.code());
        assert_eq!(twice.message(), original.message());
        // no wrapping layer was added
        assert!(twice.cause().is_none());
    }

    #[test]
    fn internal_error_surfaces_as_generic_exception() {
        let internal = InternalError::database("insert", "connection reset");
        let exception = to_exception(Error::Internal(internal.clone()));

        assert_eq!(exception.code(), ExceptionCode::InternalServer);
        assert_eq!(exception.status(), 500);
        match exception.cause() {
            Some(Cause::Internal(cause)) => assert_eq!(cause.code(), internal.code()),
            other => panic!("expected internal cause, got {other:?}"),
        }
    }

    #[test]
    fn to_unknown_error_passes_internal_through() {
        let internal = InternalError::cancelled();
        let converted = to_unknown_error("wrapped", Error::Internal(internal.clone()));
        assert_eq!(converted.code(), internal.code());
        assert!(converted.cause().is_none());
    }

    #[test]
    fn foreign_error_is_preserved_as_cause() {
        let io = std::io::Error::other("socket closed");
        let internal = unknown_from("unexpected failure", &io);

        assert_eq!(internal.code(), InternalCode::Unknown);
        match internal.cause() {
            Some(Cause::Foreign { message, .. }) => assert_eq!(message, "socket closed"),
            other => panic!("expected foreign cause, got {other:?}"),
        }
    }
}
