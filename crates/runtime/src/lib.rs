#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Managed effect runtime for the relay backend
//!
//! Every request handler and background job runs inside this runtime. It
//! supplies the ambient request context, converts defects (panics and other
//! undeclared failures) into the taxonomy, logs each terminal failure
//! exactly once, guarantees scope finalization on every exit path, and
//! unwraps the result for the calling boundary.
//!
//! Per-computation state machine:
//!
//! ```text
//! Pending → Running → {Succeeded | Failed | Defected} → Finalized
//! ```

pub mod cancel;
pub mod context;
pub mod runtime;
pub mod scope;

pub use cancel::{cancellation_pair, CancellationHandle, CancellationToken};
pub use context::{with_request, RequestContext};
pub use runtime::{RunOutcome, Runtime};
pub use scope::Scope;
