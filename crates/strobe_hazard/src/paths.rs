//! Path-delay calculation over an acyclic combinational view.
//!
//! For each pass, the netlist is projected onto a fresh [`Graph`]: one node
//! per net, one edge per gate input-to-output pin pair, weighted by that
//! pin's worst-case (critical pass) or best-case (minimum pass) delay at
//! the output net's load. Arcs of recognized feedback-register net pairs
//! are omitted so the sequential circuit reads as a DAG; a cycle that
//! survives the omission is a synthesis failure. The graph is rebuilt per
//! pass and discarded.

use std::collections::HashMap;

use strobe_diagnostics::{TraceLevel, TraceMessage, TraceSink};
use strobe_graph::{Extremum, Graph, GraphError, NodeId};
use strobe_netlist::{NetId, Netlist};

use crate::error::HazardError;

const TAG: &str = "PATH";

/// Worst- and best-case path delays from boundary inputs to every
/// reachable net, in nanoseconds.
#[derive(Debug, Clone, Default)]
pub struct PathDelays {
    critical: HashMap<(NetId, NetId), f64>,
    minimum: HashMap<(NetId, NetId), f64>,
}

impl PathDelays {
    /// Worst-case delay from a boundary input to a net, if reachable.
    pub fn critical_ns(&self, from: NetId, to: NetId) -> Option<f64> {
        self.critical.get(&(from, to)).copied()
    }

    /// Best-case delay from a boundary input to a net, if reachable.
    pub fn minimum_ns(&self, from: NetId, to: NetId) -> Option<f64> {
        self.minimum.get(&(from, to)).copied()
    }
}

/// Computes critical and minimum path delays from every boundary input.
///
/// `feedback_arcs` lists the (driving net, feedback net) pin-pair arcs to
/// omit from the combinational view.
pub fn compute_path_delays(
    netlist: &Netlist<'_>,
    boundary_inputs: &[NetId],
    feedback_arcs: &[(NetId, NetId)],
    sink: &TraceSink,
) -> Result<PathDelays, HazardError> {
    let mut delays = PathDelays::default();
    for extremum in [Extremum::Max, Extremum::Min] {
        let table = run_pass(netlist, boundary_inputs, feedback_arcs, extremum)?;
        sink.emit(TraceMessage::note(
            TraceLevel::DETAIL,
            TAG,
            format!(
                "{} pass: {} input/net delay pairs from {} boundary inputs",
                match extremum {
                    Extremum::Max => "critical",
                    Extremum::Min => "minimum",
                },
                table.len(),
                boundary_inputs.len()
            ),
        ));
        match extremum {
            Extremum::Max => delays.critical = table,
            Extremum::Min => delays.minimum = table,
        }
    }
    Ok(delays)
}

/// One extremum pass: build the view, check acyclicity, relax from every
/// boundary input.
fn run_pass(
    netlist: &Netlist<'_>,
    boundary_inputs: &[NetId],
    feedback_arcs: &[(NetId, NetId)],
    extremum: Extremum,
) -> Result<HashMap<(NetId, NetId), f64>, HazardError> {
    let (mut graph, node_of) = build_view(netlist, feedback_arcs, extremum)?;
    graph.topological_sort().map_err(|e| match e {
        GraphError::Cyclic => HazardError::ResidualCycle,
        other => other.into(),
    })?;

    let mut table = HashMap::new();
    for &input in boundary_inputs {
        let Some(&src) = node_of.get(&input) else {
            continue;
        };
        graph.shortest_paths(src, extremum)?;
        for (&net, &node) in &node_of {
            match graph.path_weight(node) {
                Ok(w) => {
                    table.insert((input, net), w);
                }
                Err(GraphError::NoPath) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(table)
}

/// Projects the netlist onto a weighted graph, one node per net.
///
/// Parallel pin pairs between the same net pair collapse into one edge
/// carrying the pass's extremal weight.
fn build_view(
    netlist: &Netlist<'_>,
    feedback_arcs: &[(NetId, NetId)],
    extremum: Extremum,
) -> Result<(Graph, HashMap<NetId, NodeId>), HazardError> {
    let mut weights: HashMap<(NetId, NetId), f64> = HashMap::new();
    for (gate, _) in netlist.gates.iter() {
        let Some(out_port) = netlist.output_port(gate) else {
            continue;
        };
        let Some(out_net) = netlist.ports.get(out_port).net else {
            continue;
        };
        let load = netlist.net_load(out_net);
        for pin in netlist.input_ports(gate) {
            let port = netlist.ports.get(pin);
            let Some(in_net) = port.net else {
                continue;
            };
            if feedback_arcs.contains(&(in_net, out_net)) {
                continue;
            }
            let w = match &port.delay {
                Some(model) => match extremum {
                    Extremum::Max => model.worst_ns(load),
                    Extremum::Min => model.best_ns(load),
                },
                None => 0.0,
            };
            weights
                .entry((in_net, out_net))
                .and_modify(|e| {
                    *e = match extremum {
                        Extremum::Max => e.max(w),
                        Extremum::Min => e.min(w),
                    }
                })
                .or_insert(w);
        }
    }

    let mut graph = Graph::new();
    let mut node_of = HashMap::new();
    for net in netlist.nets.keys() {
        node_of.insert(net, graph.add_node(u64::from(net.as_raw())));
    }
    for ((src, dst), w) in weights {
        graph.connect(node_of[&src], node_of[&dst], w, 0)?;
    }
    Ok((graph, node_of))
}
