//! Uuid-backed entity identifiers
//!
//! Each identifier is its own type so a `ContactId` can never be passed
//! where a `WorkspaceId` is expected. Serde goes through the string form, so
//! a malformed id fails schema decode with a descriptive message.

use relay_errors::{Error, Exception};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from the canonical hyphenated string form.
            ///
            /// # Errors
            ///
            /// Returns a `BadRequest` exception when the input is not a
            /// valid uuid.
            pub fn parse(input: &str) -> Result<Self, Error> {
                Uuid::parse_str(input).map(Self).map_err(|_| {
                    Exception::bad_request(concat!("invalid ", $label, " identifier")).into()
                })
            }

            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self, Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a contact.
    ContactId,
    "contact"
);
entity_id!(
    /// Unique identifier for a workspace.
    WorkspaceId,
    "workspace"
);
entity_id!(
    /// Unique identifier for a space within a workspace.
    SpaceId,
    "space"
);
