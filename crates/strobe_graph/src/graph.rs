//! The weighted directed graph structure and its mutation operations.
//!
//! Nodes and edges live in generational [`SlotArena`]s and are addressed by
//! [`NodeId`]/[`EdgeId`] handles. Structural invariants maintained here:
//! an edge handle appears in exactly one node's outgoing list and one
//! node's incoming list, and [`connect`](Graph::connect) is idempotent for
//! an existing (src, dst) pair. Computed layers are valid only until the
//! next structural mutation.

use crate::arena::{Handle, SlotArena};
use crate::error::GraphError;
use crate::ids::{EdgeId, NodeId};
use crate::layer::Layer;
use serde::{Deserialize, Serialize};

/// Traversal color used by depth-first passes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub(crate) enum Color {
    /// Not yet discovered.
    #[default]
    White,
    /// Discovered, traversal in progress. An edge into a gray node is a
    /// back edge.
    Gray,
    /// Finished.
    Black,
}

/// A node in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Opaque user tag (weak link to the net or entity this node stands for).
    pub tag: u64,
    /// Layer index assigned by the last layering pass.
    pub layer: u32,
    /// Whether this node was introduced by edge subdivision during layering.
    pub synthetic: bool,
    /// Traversal color for the depth-first passes.
    pub(crate) color: Color,
    /// Discovery timestamp from the last forward traversal.
    pub(crate) discovery: u32,
    /// Finish timestamp from the last forward traversal.
    pub(crate) finish_fwd: u32,
    /// Finish timestamp from the last reverse traversal.
    pub(crate) finish_rev: u32,
    /// Predecessor edge set by the last path computation. Weak: valid only
    /// until the next `shortest_paths` call.
    pub(crate) pred: Option<EdgeId>,
    /// Accumulated path weight from the last path computation, in the
    /// (possibly negated) relaxation space.
    pub(crate) dist: f64,
    /// Outgoing edge handles.
    pub(crate) out_edges: Vec<EdgeId>,
    /// Incoming edge handles.
    pub(crate) in_edges: Vec<EdgeId>,
}

impl Node {
    fn new(tag: u64, synthetic: bool) -> Self {
        Self {
            tag,
            layer: 0,
            synthetic,
            color: Color::White,
            discovery: 0,
            finish_fwd: 0,
            finish_rev: 0,
            pred: None,
            dist: f64::INFINITY,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }
}

/// A directed edge with a real-valued weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// The source node.
    pub src: NodeId,
    /// The destination node.
    pub dst: NodeId,
    /// The edge weight (a delay in nanoseconds for timing graphs).
    pub weight: f64,
    /// Opaque user tag (weak link to the pin pair this edge stands for).
    pub tag: u64,
}

/// A weighted directed graph over generational integer handles.
///
/// Built fresh for each delay-calculation pass and discarded after it.
/// See the crate docs for the traversal and path facilities layered on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub(crate) nodes: SlotArena<NodeId, Node>,
    pub(crate) edges: SlotArena<EdgeId, Edge>,
    /// Layers computed by the last layering pass.
    pub(crate) layers: Vec<Layer>,
    /// Cleared by every structural mutation.
    pub(crate) layers_valid: bool,
    /// Timestamp counter shared by the traversal passes.
    pub(crate) clock: u32,
    /// Whether a path computation has run since the last structural change.
    pub(crate) paths_computed: bool,
    /// Weight multiplier of the last path computation (1 = min, -1 = max).
    pub(crate) path_sign: f64,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node carrying the given opaque tag and returns its handle.
    pub fn add_node(&mut self, tag: u64) -> NodeId {
        self.touch();
        self.nodes.insert(Node::new(tag, false))
    }

    /// Adds a synthetic node (used by the layering pass for edge subdivision).
    pub(crate) fn add_synthetic_node(&mut self, tag: u64) -> NodeId {
        self.nodes.insert(Node::new(tag, true))
    }

    /// Connects `src` to `dst` with the given weight and tag.
    ///
    /// Idempotent: if an edge from `src` to `dst` already exists, its handle
    /// is returned unchanged and no duplicate is created (the existing
    /// weight and tag are kept).
    pub fn connect(
        &mut self,
        src: NodeId,
        dst: NodeId,
        weight: f64,
        tag: u64,
    ) -> Result<EdgeId, GraphError> {
        self.check_node(src)?;
        self.check_node(dst)?;
        if let Some(existing) = self.find_edge(src, dst) {
            return Ok(existing);
        }
        self.touch();
        let edge = self.edges.insert(Edge {
            src,
            dst,
            weight,
            tag,
        });
        self.node_mut(src)?.out_edges.push(edge);
        self.node_mut(dst)?.in_edges.push(edge);
        Ok(edge)
    }

    /// Removes an edge, unlinking it from both endpoint adjacency lists.
    pub fn disconnect(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        let (src, dst) = {
            let e = self.edges.get(edge).ok_or(GraphError::StaleHandle {
                entity: "edge",
                slot: edge.slot(),
                generation: edge.generation(),
            })?;
            (e.src, e.dst)
        };
        self.touch();
        if let Some(node) = self.nodes.get_mut(src) {
            node.out_edges.retain(|&e| e != edge);
        }
        if let Some(node) = self.nodes.get_mut(dst) {
            node.in_edges.retain(|&e| e != edge);
        }
        self.edges.remove(edge);
        Ok(())
    }

    /// Removes a node along with every edge touching it.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        let touching: Vec<EdgeId> = {
            let n = self.node(node)?;
            n.out_edges.iter().chain(n.in_edges.iter()).copied().collect()
        };
        for edge in touching {
            self.disconnect(edge)?;
        }
        self.touch();
        self.nodes.remove(node);
        Ok(())
    }

    /// Removes all nodes, edges, and layers.
    ///
    /// Handles created before the clear become stale; identity is not
    /// preserved across a clear even when slot indices are recycled.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.layers.clear();
        self.layers_valid = false;
        self.paths_computed = false;
        self.clock = 0;
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all live node handles.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    /// Returns the node for a handle, or a stale-handle error.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id).ok_or(GraphError::StaleHandle {
            entity: "node",
            slot: id.slot(),
            generation: id.generation(),
        })
    }

    /// Returns the edge for a handle, or a stale-handle error.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, GraphError> {
        self.edges.get(id).ok_or(GraphError::StaleHandle {
            entity: "edge",
            slot: id.slot(),
            generation: id.generation(),
        })
    }

    /// Returns the existing edge from `src` to `dst`, if any.
    ///
    /// Scans the outgoing list of `src`; circuit graphs have small
    /// out-degrees, so this stays cheap.
    pub fn find_edge(&self, src: NodeId, dst: NodeId) -> Option<EdgeId> {
        let node = self.nodes.get(src)?;
        node.out_edges
            .iter()
            .copied()
            .find(|&e| self.edges.get(e).is_some_and(|edge| edge.dst == dst))
    }

    /// Returns the outgoing edge handles of a node.
    pub fn outgoing(&self, id: NodeId) -> Result<&[EdgeId], GraphError> {
        Ok(&self.node(id)?.out_edges)
    }

    /// Returns the incoming edge handles of a node.
    pub fn incoming(&self, id: NodeId) -> Result<&[EdgeId], GraphError> {
        Ok(&self.node(id)?.in_edges)
    }

    /// Returns the layers computed by the last layering pass, or `None` if
    /// the graph has been structurally mutated since.
    pub fn layers(&self) -> Option<&[Layer]> {
        if self.layers_valid {
            Some(&self.layers)
        } else {
            None
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(id).ok_or(GraphError::StaleHandle {
            entity: "node",
            slot: id.slot(),
            generation: id.generation(),
        })
    }

    pub(crate) fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        self.node(id).map(|_| ())
    }

    /// Marks derived state (layers, paths) stale after a structural change.
    fn touch(&mut self) {
        self.layers_valid = false;
        self.paths_computed = false;
    }
}
