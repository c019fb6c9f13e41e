#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Contact services for the relay backend
//!
//! The feature layer: services wire the payload pipeline, the persistence
//! collaborators and the boundary rendering together. Each service method is
//! one managed computation; it classifies its own failures and lets the
//! runtime log them.

pub mod contact;
pub mod respond;
pub mod store;

pub use contact::{RegisterContact, RegisterContactService};
pub use store::{ContactRecord, ContactStore, InMemoryContactStore};
