//! Gate-level netlist model for the Strobe synthesis toolchain.
//!
//! Provides the circuit structure the simulator replays and the hazard
//! analyzer rewrites: gate nodes with three-state logic functions, nets
//! with port membership, pin-pair delay models, and a cell library with
//! the default element used to size inserted feedback delays.

#![warn(missing_docs)]

pub mod delay;
pub mod gate;
pub mod ids;
pub mod library;
pub mod model;

pub use delay::{DelayModel, Table1d, Table2d};
pub use gate::GateFn;
pub use ids::{GateId, NetId, PortId};
pub use library::{CellLibrary, CellTemplate};
pub use model::{GateNode, Net, Netlist, NetlistError, PortDir, PortInst, PortKind};
