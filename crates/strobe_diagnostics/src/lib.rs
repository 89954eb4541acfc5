//! Diagnostics for the Strobe toolchain: leveled trace messages and sinks.
//!
//! Analysis passes report results and failures through a [`TraceSink`].
//! Each [`TraceMessage`] carries a verbosity level from 0 (always-shown
//! result) to 6 (verbose trace), a severity, and a short prefix tag naming
//! the emitting component.

#![warn(missing_docs)]

pub mod message;
pub mod severity;
pub mod sink;

pub use message::{TraceLevel, TraceMessage};
pub use severity::Severity;
pub use sink::TraceSink;
