//! Cause chains
//!
//! A cause chain is a singly linked, acyclic list from a classified error
//! back to the value that originally triggered it. Foreign errors are
//! captured by stringification so the whole taxonomy stays `Clone`.

use serde_json::Value;
use std::fmt;

use crate::exception::Exception;
use crate::internal::InternalError;

/// One link in a cause chain.
#[derive(Clone, Debug)]
pub enum Cause {
    Internal(InternalError),
    Exception(Exception),
    /// An error from outside the taxonomy, captured as text.
    Foreign { type_name: String, message: String },
}

impl Cause {
    /// Capture a foreign error, unwrapping its own source one level when it
    /// has one. A source that points back at the error itself is treated as
    /// terminal so self-referential chains cannot loop.
    #[must_use]
    pub fn from_std<E>(err: &E) -> Self
    where
        E: std::error::Error,
    {
        if let Some(source) = err.source() {
            let same = std::ptr::eq(
                (source as *const dyn std::error::Error).cast::<u8>(),
                (err as *const E).cast::<u8>(),
            );
            if !same {
                return Cause::Foreign {
                    type_name: "source".to_string(),
                    message: source.to_string(),
                };
            }
        }
        Cause::Foreign {
            type_name: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
        }
    }

    /// Capture an arbitrary opaque value (e.g. a panic payload).
    #[must_use]
    pub fn foreign(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Cause::Foreign {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Walk to the root of the chain.
    #[must_use]
    pub fn root(&self) -> &Cause {
        let mut current = self;
        loop {
            let next = match current {
                Cause::Internal(err) => err.cause(),
                Cause::Exception(err) => err.cause(),
                Cause::Foreign { .. } => None,
            };
            match next {
                Some(cause) => current = cause,
                None => return current,
            }
        }
    }

    /// Depth of the chain starting at this link.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        loop {
            let next = match current {
                Cause::Internal(err) => err.cause(),
                Cause::Exception(err) => err.cause(),
                Cause::Foreign { .. } => None,
            };
            match next {
                Some(cause) => {
                    depth += 1;
                    current = cause;
                }
                None => return depth,
            }
        }
    }

    /// JSON rendering used inside log payloads.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Cause::Internal(err) => err.to_json(),
            Cause::Exception(err) => err.to_json(),
            Cause::Foreign { type_name, message } => serde_json::json!({
                "tag": "ForeignError",
                "type": type_name,
                "message": message,
            }),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Internal(err) => write!(f, "{err}"),
            Cause::Exception(err) => write!(f, "{err}"),
            Cause::Foreign { type_name, message } => write!(f, "{type_name}: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer {
        inner: std::io::Error,
    }

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer failure")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn foreign_capture_unwraps_one_source_level() {
        let outer = Outer {
            inner: std::io::Error::other("disk on fire"),
        };
        match Cause::from_std(&outer) {
            Cause::Foreign { message, .. } => assert_eq!(message, "disk on fire"),
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn root_walks_the_full_chain() {
        let root = Cause::foreign("io", "disk on fire");
        let mid = InternalError::database("insert", "write failed").with_cause(root);
        let top = Cause::Internal(InternalError::unknown("wrapped").with_cause(Cause::Internal(mid)));

        assert_eq!(top.depth(), 3);
        match top.root() {
            Cause::Foreign { message, .. } => assert_eq!(message, "disk on fire"),
            other => panic!("unexpected root: {other:?}"),
        }
    }
}
