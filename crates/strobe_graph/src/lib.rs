//! Weighted directed graph engine for the Strobe synthesis toolchain.
//!
//! The [`Graph`] is a reusable directed graph over generational
//! integer-handle nodes and edges. It provides cycle-aware depth-first
//! traversal, topological ordering, single-source shortest- and longest-path
//! computation restricted to acyclic graphs, and a layering pass that
//! subdivides long and back edges with synthetic nodes.
//!
//! A graph instance is owned exclusively by the analysis pass that created
//! it: the delay calculator builds a fresh graph per pass and discards it
//! afterwards. Handles are generational, so a handle held across a removal
//! or [`Graph::clear`] is a detectable error rather than silent reuse.

#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod graph;
pub mod ids;
pub mod layer;
pub mod paths;

pub use arena::{Handle, SlotArena};
pub use error::GraphError;
pub use graph::{Edge, Graph, Node};
pub use ids::{EdgeId, NodeId};
pub use layer::Layer;
pub use paths::Extremum;
