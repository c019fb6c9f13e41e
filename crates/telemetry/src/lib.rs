#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Telemetry for the relay backend
//!
//! Provides the sink contract the rest of the system logs through and the
//! error logger the managed runtime invokes on terminal failures. Business
//! logic never logs errors directly; the runtime taps the single terminal
//! failure of each computation and hands it here.

pub mod logger;
pub mod record;
pub mod sink;

pub use logger::{ErrorCategory, ErrorLogger};
pub use record::{LogLevel, LogRecord};
pub use sink::{MemorySink, TelemetrySink, TracingSink};
