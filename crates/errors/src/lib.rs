#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error taxonomy for the relay backend
//!
//! Every failure in the system belongs to exactly one of two families:
//!
//! - [`InternalError`] — system-internal invariant violations and unexpected
//!   states. Logged with full detail, never shown verbatim to end users.
//! - [`Exception`] — intentional, user-facing failures that carry a fixed
//!   HTTP status and a stable public code. The only family permitted to
//!   cross the system boundary toward a client.
//!
//! The families never share a constructor. Family membership is the enum
//! discriminant of [`Error`], so a plain JSON object that merely looks like
//! an exception can never be misclassified — there is no structural check
//! anywhere.
//!
//! Anything raised outside this taxonomy (a panic, a foreign library error)
//! is a *defect*; the conversion functions in [`convert`] classify defects
//! into the taxonomy before they can reach a caller.

use thiserror::Error as ThisError;

pub mod cause;
pub mod convert;
pub mod exception;
pub mod internal;
pub mod validation;

pub use cause::Cause;
pub use convert::{to_exception, to_unknown_error};
pub use exception::{Exception, ExceptionCode};
pub use internal::{InternalCode, InternalData, InternalError};
pub use validation::{SchemaIssue, ValidationIssue};

/// Which of the two families an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Internal,
    Exception,
}

/// Classified error used at every cross-crate boundary.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    #[error(transparent)]
    Internal(#[from] InternalError),

    #[error(transparent)]
    Exception(#[from] Exception),
}

impl Error {
    /// Family discriminant. This is the only sanctioned way to identify an
    /// error's family.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Internal(_) => ErrorKind::Internal,
            Error::Exception(_) => ErrorKind::Exception,
        }
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    #[must_use]
    pub fn is_exception(&self) -> bool {
        self.kind() == ErrorKind::Exception
    }

    /// Stable tag identifying the concrete error type.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Error::Internal(err) => err.tag(),
            Error::Exception(err) => err.tag(),
        }
    }

    /// The error recorded as having triggered this one, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Error::Internal(err) => err.cause(),
            Error::Exception(err) => err.cause(),
        }
    }

    /// The cause to attach when re-wrapping this error: its own cause when
    /// present, otherwise the error itself. Self-as-cause keeps the original
    /// identity visible through any number of wrapping layers.
    #[must_use]
    pub fn infer_cause(&self) -> Cause {
        match self.cause() {
            Some(cause) => cause.clone(),
            None => match self {
                Error::Internal(err) => Cause::Internal(err.clone()),
                Error::Exception(err) => Cause::Exception(err.clone()),
            },
        }
    }

    /// JSON shape used for logging and (for exceptions) the HTTP body:
    /// `{tag, code, message, data?}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Error::Internal(err) => err.to_json(),
            Error::Exception(err) => err.to_json(),
        }
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;
