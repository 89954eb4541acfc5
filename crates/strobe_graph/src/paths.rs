//! Topological ordering and single-source extremal paths on acyclic graphs.
//!
//! [`Graph::topological_sort`] runs a cycle-aware depth-first traversal over
//! every component. [`Graph::shortest_paths`] relaxes each edge exactly once
//! in reverse topological order (O(V+E)); the same relaxation routine serves
//! both minimum- and maximum-weight queries by negating weights on entry and
//! negating results back on exit.

use crate::error::GraphError;
use crate::graph::{Color, Graph};
use crate::ids::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Which extremum a path computation optimizes.
///
/// `Max` reuses the minimum-path relaxation on negated weights; callers see
/// un-negated weights from [`Graph::path_weight`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Extremum {
    /// Minimum total path weight (best-case delay).
    Min,
    /// Maximum total path weight (critical delay).
    Max,
}

impl Extremum {
    /// The weight multiplier implementing the negation trick.
    fn sign(self) -> f64 {
        match self {
            Extremum::Min => 1.0,
            Extremum::Max => -1.0,
        }
    }
}

impl Graph {
    /// Computes a depth-first finish order and determines acyclicity.
    ///
    /// Traverses every component, not just the one containing the first
    /// node. The returned list is in finish order: for every edge (u, v),
    /// `v` appears before `u`, dependencies first. A back edge into an
    /// in-progress node marks the whole graph cyclic and fails the sort.
    ///
    /// Also stamps each node's discovery and forward finish timestamps,
    /// which the layering pass reuses.
    pub fn topological_sort(&mut self) -> Result<Vec<NodeId>, GraphError> {
        let roots = self.node_ids();
        for &id in &roots {
            let node = self.node_mut(id)?;
            node.color = Color::White;
        }
        self.clock = 0;
        let mut order = Vec::with_capacity(roots.len());
        let mut cyclic = false;
        for root in roots {
            if self.node(root)?.color == Color::White {
                self.dfs_forward(root, &mut order, &mut cyclic)?;
            }
        }
        if cyclic {
            return Err(GraphError::Cyclic);
        }
        Ok(order)
    }

    /// Iterative depth-first visit from `root`, appending nodes in finish
    /// order. Sets `cyclic` when a back edge (edge into a gray node) is
    /// seen; traversal continues so every node still gets timestamps.
    pub(crate) fn dfs_forward(
        &mut self,
        root: NodeId,
        order: &mut Vec<NodeId>,
        cyclic: &mut bool,
    ) -> Result<(), GraphError> {
        // Stack frames carry the index of the next outgoing edge to follow.
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        self.clock += 1;
        let discovery = self.clock;
        let node = self.node_mut(root)?;
        node.color = Color::Gray;
        node.discovery = discovery;

        while let Some(&mut (id, ref mut next)) = stack.last_mut() {
            let edge = self.node(id)?.out_edges.get(*next).copied();
            match edge {
                Some(edge) => {
                    *next += 1;
                    let dst = self.edge(edge)?.dst;
                    match self.node(dst)?.color {
                        Color::White => {
                            self.clock += 1;
                            let discovery = self.clock;
                            let node = self.node_mut(dst)?;
                            node.color = Color::Gray;
                            node.discovery = discovery;
                            stack.push((dst, 0));
                        }
                        Color::Gray => *cyclic = true,
                        Color::Black => {}
                    }
                }
                None => {
                    stack.pop();
                    self.clock += 1;
                    let finish = self.clock;
                    let node = self.node_mut(id)?;
                    node.color = Color::Black;
                    node.finish_fwd = finish;
                    order.push(id);
                }
            }
        }
        Ok(())
    }

    /// Computes extremal path weights from `source` to every reachable node.
    ///
    /// Valid only on acyclic graphs; a cyclic graph is a reported
    /// [`GraphError::Cyclic`]. Processes nodes in reverse topological order
    /// and relaxes each outgoing edge exactly once. Sets the per-node
    /// predecessor back-references used by [`path_weight`](Graph::path_weight)
    /// and [`path_nodes`](Graph::path_nodes); a later call invalidates
    /// reconstructions from earlier calls.
    pub fn shortest_paths(
        &mut self,
        source: NodeId,
        extremum: Extremum,
    ) -> Result<(), GraphError> {
        self.check_node(source)?;
        let order = self.topological_sort()?;
        let sign = extremum.sign();

        for &id in &order {
            let node = self.node_mut(id)?;
            node.dist = f64::INFINITY;
            node.pred = None;
        }
        self.node_mut(source)?.dist = 0.0;

        // Finish order lists dependencies first; walk it backwards so every
        // node is settled before its outgoing edges are relaxed.
        for &id in order.iter().rev() {
            let dist = self.node(id)?.dist;
            if dist == f64::INFINITY {
                continue;
            }
            let out: Vec<EdgeId> = self.node(id)?.out_edges.clone();
            for edge_id in out {
                let (dst, weight) = {
                    let e = self.edge(edge_id)?;
                    (e.dst, e.weight)
                };
                let candidate = dist + weight * sign;
                let dst_node = self.node_mut(dst)?;
                if candidate < dst_node.dist {
                    dst_node.dist = candidate;
                    dst_node.pred = Some(edge_id);
                }
            }
        }

        self.path_sign = sign;
        self.paths_computed = true;
        Ok(())
    }

    /// Returns the extremal path weight from the last computation's source
    /// to `dst`.
    ///
    /// Fails with [`GraphError::NotComputed`] before any computation and
    /// [`GraphError::NoPath`] for an unreachable destination. Maximum-weight
    /// results are negated back to caller space here.
    pub fn path_weight(&self, dst: NodeId) -> Result<f64, GraphError> {
        if !self.paths_computed {
            return Err(GraphError::NotComputed);
        }
        let dist = self.node(dst)?.dist;
        if dist == f64::INFINITY {
            return Err(GraphError::NoPath);
        }
        Ok(dist * self.path_sign)
    }

    /// Reconstructs the node sequence of the extremal path ending at `dst`
    /// (source first) by following predecessor back-references.
    pub fn path_nodes(&self, dst: NodeId) -> Result<Vec<NodeId>, GraphError> {
        if !self.paths_computed {
            return Err(GraphError::NotComputed);
        }
        if self.node(dst)?.dist == f64::INFINITY {
            return Err(GraphError::NoPath);
        }
        let mut path = vec![dst];
        let mut current = dst;
        while let Some(edge_id) = self.node(current)?.pred {
            current = self.edge(edge_id)?.src;
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topo_sort_chain() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        let c = g.add_node(2);
        g.connect(a, b, 1.0, 0).unwrap();
        g.connect(b, c, 1.0, 0).unwrap();
        let order = g.topological_sort().unwrap();
        assert_eq!(order.len(), 3);
        // Finish order: dependencies before dependents.
        let pos = |n| order.iter().position(|&x| x == n).unwrap();
        assert!(pos(c) < pos(b));
        assert!(pos(b) < pos(a));
    }

    #[test]
    fn topo_sort_detects_cycle() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        g.connect(a, b, 1.0, 0).unwrap();
        g.connect(b, a, 1.0, 0).unwrap();
        assert_eq!(g.topological_sort(), Err(GraphError::Cyclic));
    }

    #[test]
    fn topo_sort_self_loop_is_cyclic() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        g.connect(a, a, 1.0, 0).unwrap();
        assert_eq!(g.topological_sort(), Err(GraphError::Cyclic));
    }

    #[test]
    fn topo_sort_covers_all_components() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        g.connect(a, b, 1.0, 0).unwrap();
        // Disconnected second component with a cycle: must still be found.
        let c = g.add_node(2);
        let d = g.add_node(3);
        g.connect(c, d, 1.0, 0).unwrap();
        g.connect(d, c, 1.0, 0).unwrap();
        assert_eq!(g.topological_sort(), Err(GraphError::Cyclic));
    }

    #[test]
    fn topo_sort_multi_component_order() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        let c = g.add_node(2);
        g.connect(a, b, 1.0, 0).unwrap();
        // c is isolated.
        let order = g.topological_sort().unwrap();
        assert_eq!(order.len(), 3);
        assert!(order.contains(&c));
    }

    #[test]
    fn shortest_path_single_edge() {
        // Scenario: A -> B weight 5; PathWeight(A, B) = 5.0.
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        g.connect(a, b, 5.0, 0).unwrap();
        g.shortest_paths(a, Extremum::Min).unwrap();
        assert_eq!(g.path_weight(b).unwrap(), 5.0);
        assert_eq!(g.path_weight(a).unwrap(), 0.0);
    }

    fn diamond() -> (Graph, NodeId, NodeId, NodeId, NodeId) {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        let c = g.add_node(2);
        let d = g.add_node(3);
        g.connect(a, b, 15.0, 0).unwrap();
        g.connect(a, c, 20.0, 0).unwrap();
        g.connect(b, d, 2.0, 0).unwrap();
        g.connect(c, d, 2.0, 0).unwrap();
        (g, a, b, c, d)
    }

    #[test]
    fn diamond_min_path_via_b() {
        let (mut g, a, b, _, d) = diamond();
        g.shortest_paths(a, Extremum::Min).unwrap();
        assert_eq!(g.path_weight(d).unwrap(), 17.0);
        assert_eq!(g.path_nodes(d).unwrap(), vec![a, b, d]);
    }

    #[test]
    fn diamond_max_recovers_via_negation() {
        let (mut g, a, _, c, d) = diamond();
        g.shortest_paths(a, Extremum::Max).unwrap();
        assert_eq!(g.path_weight(d).unwrap(), 22.0);
        assert_eq!(g.path_nodes(d).unwrap(), vec![a, c, d]);
    }

    #[test]
    fn path_nodes_reconstruction() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        let c = g.add_node(2);
        let d = g.add_node(3);
        g.connect(a, b, 1.0, 0).unwrap();
        g.connect(a, c, 10.0, 0).unwrap();
        g.connect(b, d, 1.0, 0).unwrap();
        g.connect(c, d, 1.0, 0).unwrap();
        g.shortest_paths(a, Extremum::Min).unwrap();
        assert_eq!(g.path_nodes(d).unwrap(), vec![a, b, d]);
        g.shortest_paths(a, Extremum::Max).unwrap();
        // A later call invalidates earlier reconstructions: the maximum
        // path is now reported.
        assert_eq!(g.path_nodes(d).unwrap(), vec![a, c, d]);
    }

    #[test]
    fn paths_fail_on_cyclic_graph() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        g.connect(a, b, 1.0, 0).unwrap();
        g.connect(b, a, 1.0, 0).unwrap();
        assert_eq!(g.shortest_paths(a, Extremum::Min), Err(GraphError::Cyclic));
    }

    #[test]
    fn unreachable_is_no_path() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        let lone = g.add_node(2);
        g.connect(a, b, 1.0, 0).unwrap();
        g.shortest_paths(a, Extremum::Min).unwrap();
        assert_eq!(g.path_weight(lone), Err(GraphError::NoPath));
        assert_eq!(g.path_nodes(lone), Err(GraphError::NoPath));
    }

    #[test]
    fn path_weight_before_computation_fails() {
        let mut g = Graph::new();
        let a = g.add_node(0);
        assert_eq!(g.path_weight(a), Err(GraphError::NotComputed));
        g.shortest_paths(a, Extremum::Min).unwrap();
        assert_eq!(g.path_weight(a).unwrap(), 0.0);
        // A structural mutation invalidates the computation.
        g.add_node(1);
        assert_eq!(g.path_weight(a), Err(GraphError::NotComputed));
    }

    #[test]
    fn negative_weights_on_dag_are_fine() {
        // The reverse-topological relaxation does not require non-negative
        // weights, unlike Dijkstra.
        let mut g = Graph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        let c = g.add_node(2);
        g.connect(a, b, 5.0, 0).unwrap();
        g.connect(b, c, -3.0, 0).unwrap();
        g.shortest_paths(a, Extremum::Min).unwrap();
        assert_eq!(g.path_weight(c).unwrap(), 2.0);
    }
}
