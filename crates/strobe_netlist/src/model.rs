//! The mutable gate-level netlist.
//!
//! [`Netlist`] owns arenas of gates, nets, and port instances, with the
//! mutation API the hazard analyzer uses for delay-element insertion and
//! port reclassification. Connectivity is kept doubly: a port records the
//! net it joins, and a net records every joined port.

use serde::{Deserialize, Serialize};
use strobe_common::{Arena, Ident, Interner, Logic};

use crate::delay::DelayModel;
use crate::gate::GateFn;
use crate::ids::{GateId, NetId, PortId};
use crate::library::CellTemplate;

/// Direction of a port instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDir {
    /// The port reads its net.
    Input,
    /// The port drives its net.
    Output,
}

/// Functional classification of a port, used by the analyzer to recognize
/// feedback-register pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// A clock pin.
    Clock,
    /// An asynchronous set pin.
    Set,
    /// An asynchronous clear pin.
    Clear,
    /// An ordinary logic pin.
    Logic,
}

/// A port instance on a gate node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortInst {
    /// Port name.
    pub name: Ident,
    /// Direction.
    pub dir: PortDir,
    /// Functional classification.
    pub kind: PortKind,
    /// The gate this port belongs to.
    pub gate: GateId,
    /// The net this port joins, if any.
    pub net: Option<NetId>,
    /// Input pin capacitance, in load units. Zero for outputs.
    pub input_cap: f64,
    /// Delay of the arc from this input pin to the gate output.
    /// `None` for output ports and for undelayed pins.
    pub delay: Option<DelayModel>,
}

/// A gate node: a logic function with its port instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateNode {
    /// Instance name.
    pub name: Ident,
    /// The logic function this gate computes.
    pub func: GateFn,
    /// All ports on this gate, inputs before the output.
    pub ports: Vec<PortId>,
}

/// A net: a wire joining one driver and any number of readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// Net name.
    pub name: Ident,
    /// Every port joined to this net.
    pub ports: Vec<PortId>,
}

/// Errors from netlist mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// A port was joined while already on a net.
    #[error("port {port} is already joined to a net")]
    AlreadyJoined {
        /// Raw index of the offending port.
        port: u32,
    },

    /// A gate needed for splicing has no output port.
    #[error("gate {gate} has no output port")]
    NoOutput {
        /// Raw index of the offending gate.
        gate: u32,
    },
}

/// The mutable gate-level netlist.
#[derive(Clone)]
pub struct Netlist<'a> {
    /// All gate nodes.
    pub gates: Arena<GateId, GateNode>,
    /// All nets.
    pub nets: Arena<NetId, Net>,
    /// All port instances.
    pub ports: Arena<PortId, PortInst>,
    /// String interner (borrowed from the caller, shared across clones).
    pub interner: &'a Interner,
    /// Counter for generated instance names.
    next_auto: u32,
}

impl<'a> Netlist<'a> {
    /// Creates an empty netlist over the given interner.
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            gates: Arena::new(),
            nets: Arena::new(),
            ports: Arena::new(),
            interner,
            next_auto: 0,
        }
    }

    /// Adds a gate node with no ports yet.
    pub fn add_gate(&mut self, name: &str, func: GateFn) -> GateId {
        let name = self.interner.get_or_intern(name);
        self.gates.alloc(GateNode {
            name,
            func,
            ports: Vec::new(),
        })
    }

    /// Adds a port instance to a gate.
    pub fn add_port(
        &mut self,
        gate: GateId,
        name: &str,
        dir: PortDir,
        kind: PortKind,
        input_cap: f64,
        delay: Option<DelayModel>,
    ) -> PortId {
        let name = self.interner.get_or_intern(name);
        let id = self.ports.alloc(PortInst {
            name,
            dir,
            kind,
            gate,
            net: None,
            input_cap,
            delay,
        });
        self.gates.get_mut(gate).ports.push(id);
        id
    }

    /// Adds a net with no members.
    pub fn add_net(&mut self, name: &str) -> NetId {
        let name = self.interner.get_or_intern(name);
        self.nets.alloc(Net {
            name,
            ports: Vec::new(),
        })
    }

    /// Joins a port to a net.
    ///
    /// Joining a port that already sits on that same net is a no-op; a port
    /// on a different net must be detached first.
    pub fn join(&mut self, port: PortId, net: NetId) -> Result<(), NetlistError> {
        match self.ports.get(port).net {
            Some(existing) if existing == net => return Ok(()),
            Some(_) => {
                return Err(NetlistError::AlreadyJoined {
                    port: port.as_raw(),
                })
            }
            None => {}
        }
        self.ports.get_mut(port).net = Some(net);
        self.nets.get_mut(net).ports.push(port);
        Ok(())
    }

    /// Detaches a port from its net, if joined.
    pub fn detach(&mut self, port: PortId) {
        if let Some(net) = self.ports.get_mut(port).net.take() {
            self.nets.get_mut(net).ports.retain(|&p| p != port);
        }
    }

    /// Reclassifies a port's functional kind.
    pub fn reclassify(&mut self, port: PortId, kind: PortKind) {
        self.ports.get_mut(port).kind = kind;
    }

    /// Returns the output port of a gate, if it has one.
    pub fn output_port(&self, gate: GateId) -> Option<PortId> {
        self.gates
            .get(gate)
            .ports
            .iter()
            .copied()
            .find(|&p| self.ports.get(p).dir == PortDir::Output)
    }

    /// Returns the input ports of a gate, in declaration order.
    pub fn input_ports(&self, gate: GateId) -> Vec<PortId> {
        self.gates
            .get(gate)
            .ports
            .iter()
            .copied()
            .filter(|&p| self.ports.get(p).dir == PortDir::Input)
            .collect()
    }

    /// Returns the output ports joined to a net.
    pub fn drivers(&self, net: NetId) -> Vec<PortId> {
        self.nets
            .get(net)
            .ports
            .iter()
            .copied()
            .filter(|&p| self.ports.get(p).dir == PortDir::Output)
            .collect()
    }

    /// Returns the input ports joined to a net.
    pub fn readers(&self, net: NetId) -> Vec<PortId> {
        self.nets
            .get(net)
            .ports
            .iter()
            .copied()
            .filter(|&p| self.ports.get(p).dir == PortDir::Input)
            .collect()
    }

    /// Returns the gate whose output drives a net, if any.
    pub fn driver_gate(&self, net: NetId) -> Option<GateId> {
        self.drivers(net).first().map(|&p| self.ports.get(p).gate)
    }

    /// Total load on a net: the sum of its readers' input capacitances.
    pub fn net_load(&self, net: NetId) -> f64 {
        self.readers(net)
            .iter()
            .map(|&p| self.ports.get(p).input_cap)
            .sum()
    }

    /// Evaluates a gate's output from its input net values.
    ///
    /// `value_of` supplies the current value of each net; an unjoined input
    /// pin reads as unknown.
    pub fn eval_gate(&self, gate: GateId, value_of: impl Fn(NetId) -> Logic) -> Logic {
        let inputs: Vec<Logic> = self
            .input_ports(gate)
            .iter()
            .map(|&p| match self.ports.get(p).net {
                Some(net) => value_of(net),
                None => Logic::X,
            })
            .collect();
        self.gates.get(gate).func.eval(&inputs)
    }

    /// Splices a chain of `count` delay elements into a net.
    ///
    /// The net keeps its driver; its readers are moved to the tail net of
    /// the chain. Each element is instantiated from `element`, with its
    /// input pin carrying the template's capacitance and delay arc. Returns
    /// the spliced gate IDs in chain order.
    pub fn splice_delay_chain(
        &mut self,
        net: NetId,
        count: usize,
        element: &CellTemplate,
    ) -> Result<Vec<GateId>, NetlistError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let moved_readers = self.readers(net);
        let mut inserted = Vec::with_capacity(count);
        let mut prev = net;
        for _ in 0..count {
            let n = self.next_auto;
            self.next_auto += 1;
            let gate = self.add_gate(&format!("_dly_{n}"), element.func);
            let pin_in = self.add_port(
                gate,
                "a",
                PortDir::Input,
                PortKind::Logic,
                element.input_cap,
                Some(element.delay.clone()),
            );
            let pin_out = self.add_port(gate, "y", PortDir::Output, PortKind::Logic, 0.0, None);
            let stage = self.add_net(&format!("_dly_net_{n}"));
            self.join(pin_in, prev)?;
            self.join(pin_out, stage)?;
            inserted.push(gate);
            prev = stage;
        }
        for reader in moved_readers {
            self.detach(reader);
            self.join(reader, prev)?;
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::CellLibrary;

    fn buf_between<'a>(nl: &mut Netlist<'a>, name: &str, src: NetId, dst: NetId) -> GateId {
        let g = nl.add_gate(name, GateFn::Buf);
        let a = nl.add_port(
            g,
            "a",
            PortDir::Input,
            PortKind::Logic,
            1.0,
            Some(DelayModel::Fixed {
                block_ns: 1.0,
                fanout_ns_per_load: 0.0,
            }),
        );
        let y = nl.add_port(g, "y", PortDir::Output, PortKind::Logic, 0.0, None);
        nl.join(a, src).unwrap();
        nl.join(y, dst).unwrap();
        g
    }

    #[test]
    fn join_records_both_sides() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        let y = nl.add_net("y");
        let g = buf_between(&mut nl, "u1", x, y);
        assert_eq!(nl.driver_gate(y), Some(g));
        assert_eq!(nl.readers(x).len(), 1);
        assert_eq!(nl.drivers(y).len(), 1);
    }

    #[test]
    fn join_same_net_is_noop() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        let g = nl.add_gate("u1", GateFn::Not);
        let a = nl.add_port(g, "a", PortDir::Input, PortKind::Logic, 1.0, None);
        nl.join(a, x).unwrap();
        nl.join(a, x).unwrap();
        assert_eq!(nl.nets.get(x).ports.len(), 1);
    }

    #[test]
    fn join_other_net_rejected() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        let y = nl.add_net("y");
        let g = nl.add_gate("u1", GateFn::Not);
        let a = nl.add_port(g, "a", PortDir::Input, PortKind::Logic, 1.0, None);
        nl.join(a, x).unwrap();
        let err = nl.join(a, y).unwrap_err();
        assert_eq!(err, NetlistError::AlreadyJoined { port: a.as_raw() });
    }

    #[test]
    fn detach_then_rejoin() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        let y = nl.add_net("y");
        let g = nl.add_gate("u1", GateFn::Not);
        let a = nl.add_port(g, "a", PortDir::Input, PortKind::Logic, 1.0, None);
        nl.join(a, x).unwrap();
        nl.detach(a);
        assert!(nl.nets.get(x).ports.is_empty());
        nl.join(a, y).unwrap();
        assert_eq!(nl.ports.get(a).net, Some(y));
    }

    #[test]
    fn net_load_sums_reader_caps() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        for i in 0..3 {
            let g = nl.add_gate(&format!("u{i}"), GateFn::Not);
            let a = nl.add_port(g, "a", PortDir::Input, PortKind::Logic, 0.5, None);
            nl.join(a, x).unwrap();
        }
        assert!((nl.net_load(x) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn reclassify_changes_kind() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let g = nl.add_gate("ff", GateFn::Buf);
        let a = nl.add_port(g, "d", PortDir::Input, PortKind::Logic, 1.0, None);
        nl.reclassify(a, PortKind::Clock);
        assert_eq!(nl.ports.get(a).kind, PortKind::Clock);
    }

    #[test]
    fn eval_gate_reads_input_nets() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        let y = nl.add_net("y");
        let z = nl.add_net("z");
        let g = nl.add_gate("u1", GateFn::And);
        let a = nl.add_port(g, "a", PortDir::Input, PortKind::Logic, 1.0, None);
        let b = nl.add_port(g, "b", PortDir::Input, PortKind::Logic, 1.0, None);
        let out = nl.add_port(g, "y", PortDir::Output, PortKind::Logic, 0.0, None);
        nl.join(a, x).unwrap();
        nl.join(b, y).unwrap();
        nl.join(out, z).unwrap();
        let v = nl.eval_gate(g, |n| if n == x { Logic::One } else { Logic::Zero });
        assert_eq!(v, Logic::Zero);
    }

    #[test]
    fn eval_gate_unjoined_input_is_unknown() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let g = nl.add_gate("u1", GateFn::Buf);
        nl.add_port(g, "a", PortDir::Input, PortKind::Logic, 1.0, None);
        assert_eq!(nl.eval_gate(g, |_| Logic::One), Logic::X);
    }

    #[test]
    fn splice_moves_readers_to_tail() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let lib = CellLibrary::standard();
        let x = nl.add_net("x");
        let y = nl.add_net("y");
        buf_between(&mut nl, "u1", x, y);
        let chain = nl
            .splice_delay_chain(x, 2, lib.default_delay())
            .unwrap();
        assert_eq!(chain.len(), 2);
        // The original reader now sits behind the chain tail.
        assert!(nl.readers(x).len() == 1);
        let head_in = nl.input_ports(chain[0])[0];
        assert_eq!(nl.ports.get(head_in).net, Some(x));
        let tail_out = nl.output_port(chain[1]).unwrap();
        let tail_net = nl.ports.get(tail_out).net.unwrap();
        assert_eq!(nl.readers(tail_net).len(), 1);
    }

    #[test]
    fn splice_zero_count_is_noop() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let lib = CellLibrary::standard();
        let x = nl.add_net("x");
        let before = nl.gates.len();
        let chain = nl.splice_delay_chain(x, 0, lib.default_delay()).unwrap();
        assert!(chain.is_empty());
        assert_eq!(nl.gates.len(), before);
    }

    #[test]
    fn clone_snapshots_structure() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let lib = CellLibrary::standard();
        let x = nl.add_net("x");
        let snap = nl.clone();
        nl.splice_delay_chain(x, 3, lib.default_delay()).unwrap();
        assert_eq!(snap.gates.len(), 0);
        assert_eq!(nl.gates.len(), 3);
    }
}
