//! Essential hazard analysis and correction for asynchronous machines.
//!
//! The crate ties the other layers together: it extracts combinational
//! path delays from a gate netlist, replays candidate input transitions on
//! the event simulator to find essential hazards, and splices sized delay
//! chains into feedback lines until re-simulation confirms the machine
//! settles into its declared codes.

#![warn(missing_docs)]

pub mod error;
pub mod hazard;
pub mod insert;
pub mod paths;

pub use error::HazardError;
pub use hazard::{search_hazards, HazardContext, HazardReport, SEARCH_CAP};
pub use insert::{elements_for_delay, insert_feedback_delays, DelayInsertion};
pub use paths::{compute_path_delays, PathDelays};
