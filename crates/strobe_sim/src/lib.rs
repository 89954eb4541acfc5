//! Event-driven gate-level logic simulator for the Strobe synthesis
//! toolchain.
//!
//! Replays signal propagation through a netlist with real delay values:
//! a femtosecond event queue, per-pin delay interpolation, optional
//! capacitance accounting, settle-delay matrices, and a feedback-boundary
//! stop used by the hazard analyzer.

#![warn(missing_docs)]

pub mod error;
pub mod kernel;
pub mod time;

pub use error::SimError;
pub use kernel::{SimOptions, Simulator, TimePool};
pub use time::{SimTime, FS_PER_NS, FS_PER_PS, FS_PER_US};
