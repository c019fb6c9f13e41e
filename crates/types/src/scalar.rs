//! Refined scalar types
//!
//! Parse constructors reject malformed input so the rest of the system only
//! ever sees well-formed values. Serde routes through the parse path, which
//! is what makes schema decode strict.

use relay_errors::{Error, Exception};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercased, shape-checked email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalise (trim + lowercase) an email address.
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` exception when the input does not have the
    /// `local@domain.tld` shape.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let normalised = input.trim().to_ascii_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(Exception::bad_request("invalid email address").into());
        };
        let shape_ok = !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !normalised.contains(char::is_whitespace)
            && !domain.contains('@');
        if !shape_ok {
            return Err(Exception::bad_request("invalid email address").into());
        }
        Ok(Self(normalised))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part, after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> String {
        email.0
    }
}

/// Lowercase alphanumeric-and-hyphen identifier used for spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Parse a slug.
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` exception unless the input is non-empty,
    /// contains only `a-z`, `0-9` and `-`, and neither starts nor ends with
    /// a hyphen.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let ok = !input.is_empty()
            && !input.starts_with('-')
            && !input.ends_with('-')
            && input
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if ok {
            Ok(Self(input.to_string()))
        } else {
            Err(Exception::bad_request("invalid slug").into())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> String {
        slug.0
    }
}

/// A secret that never leaves the process in readable form.
///
/// `Debug`, `Display` and `Serialize` all render `[redacted]`; the value is
/// reachable only through [`SecretString::expose_secret`].
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Deliberately explicit accessor for the underlying secret.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[redacted]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[redacted]")
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("[redacted]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}
