#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Request-payload pipeline for the relay backend
//!
//! Turns raw input into a validated, semantically mapped, schema-decoded,
//! typed value. A request-kind payload walks a strict staircase:
//!
//! ```text
//! Raw → StructurallyValidated → SemanticallyMapped → SchemaDecoded
//! ```
//!
//! Data-kind payloads are constructed only by internal, already-trusted code
//! and skip straight to schema decode — a deliberate trust boundary enforced
//! by the constructor, not a shortcut.
//!
//! Failures are classified at the stage that produced them: structural
//! problems become a `ValidationException`, decode problems become a
//! `SchemaError`, and raw parser errors never escape this crate.

pub mod decode;
pub mod payload;
pub mod rule;

pub use decode::{decode_value, redact};
pub use payload::{DataPayload, PayloadKind};
pub use rule::{Rule, RuleSet};
