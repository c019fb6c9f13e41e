#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the relay backend
//!
//! This crate provides the branded domain types used throughout the system
//! (identifiers, email addresses, slugs, redacted secrets), the merged
//! request record that feeds the payload pipeline, and the response envelope
//! rendered at the HTTP boundary.

pub mod id;
pub mod record;
pub mod response;
pub mod scalar;

pub use id::{ContactId, SpaceId, WorkspaceId};
pub use record::RequestRecord;
pub use response::ApiResponse;
pub use scalar::{EmailAddress, SecretString, Slug};
pub use uuid::Uuid;
