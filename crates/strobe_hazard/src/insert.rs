//! Corrective delay insertion with commit-or-rollback semantics.
//!
//! Required delay converts into a count of inverter-pair elements sized
//! from the library-default delay gate. Splicing happens inside a
//! [`DelayInsertion`] transaction: dropping the transaction without
//! committing restores the netlist to its pre-insertion state, so a failed
//! verification can never leave a half-rewritten circuit behind.

use strobe_diagnostics::{TraceMessage, TraceSink};
use strobe_fsm::Fsm;
use strobe_netlist::{CellLibrary, CellTemplate, GateId, NetId, Netlist};

use crate::error::HazardError;
use crate::hazard::{search_hazards, HazardContext, HazardReport};

const TAG: &str = "INSERT";

/// Converts a required delay into a count of default delay elements.
///
/// Each element in a chain drives the next element's input pin, so the
/// per-element delay includes that load. A non-positive requirement or a
/// zero-delay element needs no insertion.
pub fn elements_for_delay(required_ns: f64, library: &CellLibrary) -> usize {
    let element_ns = library.element_delay_ns();
    if required_ns <= 0.0 || element_ns <= 0.0 {
        return 0;
    }
    (required_ns / element_ns).ceil() as usize
}

/// A scoped netlist rewrite. Splices are visible immediately; they become
/// permanent only on [`commit`](DelayInsertion::commit). Dropping the
/// transaction without committing rolls every splice back.
pub struct DelayInsertion<'m, 'i> {
    netlist: &'m mut Netlist<'i>,
    snapshot: Option<Netlist<'i>>,
    inserted: Vec<GateId>,
}

impl<'m, 'i> DelayInsertion<'m, 'i> {
    /// Opens a transaction, capturing the rollback snapshot.
    pub fn begin(netlist: &'m mut Netlist<'i>) -> Self {
        let snapshot = Some(netlist.clone());
        Self {
            netlist,
            snapshot,
            inserted: Vec::new(),
        }
    }

    /// Splices a delay chain into a net within the transaction.
    pub fn splice(
        &mut self,
        net: NetId,
        count: usize,
        element: &CellTemplate,
    ) -> Result<(), HazardError> {
        let gates = self.netlist.splice_delay_chain(net, count, element)?;
        self.inserted.extend(gates);
        Ok(())
    }

    /// The netlist as rewritten so far, for verification runs.
    pub fn netlist(&self) -> &Netlist<'i> {
        self.netlist
    }

    /// The gates spliced so far, in insertion order.
    pub fn inserted(&self) -> &[GateId] {
        &self.inserted
    }

    /// Makes the rewrite permanent.
    pub fn commit(mut self) {
        self.snapshot = None;
    }
}

impl Drop for DelayInsertion<'_, '_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.netlist = snapshot;
        }
    }
}

/// Runs the hazard search, then splices the required delay into each
/// feedback line and verifies every insertion by re-simulation.
///
/// A verification failure rolls the offending insertion back and aborts
/// with [`HazardError::InsertionRejected`].
pub fn insert_feedback_delays(
    netlist: &mut Netlist<'_>,
    fsm: &Fsm,
    ctx: &HazardContext,
    library: &CellLibrary,
    sink: &TraceSink,
) -> Result<HazardReport, HazardError> {
    let report = search_hazards(netlist, fsm, ctx, sink)?;
    for (line, &required_ns) in report.required_delay_ns.iter().enumerate() {
        let count = elements_for_delay(required_ns, library);
        if count == 0 {
            continue;
        }
        let net = ctx.feedback_nets[line];
        let mut txn = DelayInsertion::begin(&mut *netlist);
        txn.splice(net, count, library.default_delay())?;
        match search_hazards(txn.netlist(), fsm, ctx, sink) {
            Ok(_) => {
                sink.emit(TraceMessage::result(
                    TAG,
                    format!(
                        "feedback net {}: {count} delay elements for {required_ns:.3} ns",
                        net.as_raw()
                    ),
                ));
                txn.commit();
            }
            Err(cause) => {
                sink.emit(TraceMessage::error(
                    TAG,
                    format!(
                        "feedback net {}: re-simulation failed ({cause}), rolling back",
                        net.as_raw()
                    ),
                ));
                drop(txn);
                return Err(HazardError::InsertionRejected { net: net.as_raw() });
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strobe_common::{Interner, Logic};
    use strobe_cube::{Cover, Cube};
    use strobe_netlist::{DelayModel, GateFn, PortDir, PortKind};

    fn cover(patterns: &[&str]) -> Cover {
        Cover::from_cubes(patterns.iter().map(|p| Cube::parse(p).unwrap()).collect())
    }

    fn small_netlist(interner: &Interner) -> (Netlist<'_>, NetId) {
        let mut nl = Netlist::new(interner);
        let x = nl.add_net("x");
        let q = nl.add_net("q");
        let g = nl.add_gate("next", GateFn::Buf);
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
        nl.join(a, x).unwrap();
        nl.join(y, q).unwrap();
        (nl, q)
    }

    #[test]
    fn element_count_rounds_up() {
        let lib = CellLibrary::standard();
        // 0.6 ns per element.
        assert_eq!(elements_for_delay(0.0, &lib), 0);
        assert_eq!(elements_for_delay(-1.0, &lib), 0);
        assert_eq!(elements_for_delay(0.6, &lib), 1);
        assert_eq!(elements_for_delay(0.61, &lib), 2);
        assert_eq!(elements_for_delay(1.3, &lib), 3);
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let interner = Interner::new();
        let (mut nl, q) = small_netlist(&interner);
        let lib = CellLibrary::standard();
        let gates_before = nl.gates.len();
        let nets_before = nl.nets.len();
        {
            let mut txn = DelayInsertion::begin(&mut nl);
            txn.splice(q, 2, lib.default_delay()).unwrap();
            assert_eq!(txn.netlist().gates.len(), gates_before + 2);
        }
        assert_eq!(nl.gates.len(), gates_before);
        assert_eq!(nl.nets.len(), nets_before);
    }

    #[test]
    fn commit_keeps_the_rewrite() {
        let interner = Interner::new();
        let (mut nl, q) = small_netlist(&interner);
        let lib = CellLibrary::standard();
        let gates_before = nl.gates.len();
        let mut txn = DelayInsertion::begin(&mut nl);
        txn.splice(q, 2, lib.default_delay()).unwrap();
        assert_eq!(txn.inserted().len(), 2);
        txn.commit();
        assert_eq!(nl.gates.len(), gates_before + 2);
    }

    /// One input forked onto two feedback nets through buffers of unequal
    /// delay, so the candidate replay settles them 2.0 ns apart.
    fn fork_circuit(interner: &Interner) -> (Netlist<'_>, NetId, NetId, NetId) {
        let mut nl = Netlist::new(interner);
        let x = nl.add_net("x");
        let q1 = nl.add_net("q1");
        let q2 = nl.add_net("q2");
        for (name, dst, block_ns) in [("fast", q1, 1.0), ("slow", q2, 3.0)] {
            let g = nl.add_gate(name, GateFn::Buf);
            let a = nl.add_port(
                g,
                "a",
                PortDir::Input,
                PortKind::Logic,
                1.0,
                Some(DelayModel::Fixed {
                    block_ns,
                    fanout_ns_per_load: 0.0,
                }),
            );
            let y = nl.add_port(g, "y", PortDir::Output, PortKind::Logic, 0.0, None);
            nl.join(a, x).unwrap();
            nl.join(y, dst).unwrap();
        }
        (nl, x, q1, q2)
    }

    #[test]
    fn unequal_feedback_delays_size_and_splice_both_lines() {
        let interner = Interner::new();
        let (mut nl, x, q1, q2) = fork_circuit(&interner);
        let ctx = HazardContext {
            input_nets: vec![x],
            feedback_nets: vec![q1, q2],
            output_nets: vec![],
        };
        let mut fsm = Fsm::new(1, 2, 1);
        let s0 = fsm
            .add_state("s0", vec![Logic::Zero, Logic::Zero], cover(&["0"]))
            .unwrap();
        let s1 = fsm
            .add_state("s1", vec![Logic::One, Logic::One], cover(&["1"]))
            .unwrap();
        fsm.add_transition(s0, s1, cover(&["1"]), cover(&["1"]))
            .unwrap();
        let lib = CellLibrary::standard();
        let sink = TraceSink::new();
        let gates_before = nl.gates.len();
        let report = insert_feedback_delays(&mut nl, &fsm, &ctx, &lib, &sink).unwrap();
        // The lines settle 1.0 ns and 3.0 ns after the firing edge.
        assert_eq!(report.candidates_checked, 1);
        assert_eq!(report.required_delay_ns.len(), 2);
        for &required in &report.required_delay_ns {
            assert!((required - 2.0).abs() < 1e-9);
        }
        // 2.0 ns over 0.6 ns elements is 4 per line, verified and kept.
        assert_eq!(elements_for_delay(2.0, &lib), 4);
        assert_eq!(nl.gates.len(), gates_before + 8);
        assert!(!sink.has_errors());
    }

    #[test]
    fn failed_verification_rolls_back_and_rejects() {
        let interner = Interner::new();
        let mut nl = Netlist::new(&interner);
        let x = nl.add_net("x");
        let q = nl.add_net("q");
        let z = nl.add_net("z");
        for (name, src, dst) in [("next", x, q), ("out", q, z)] {
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
        }
        let ctx = HazardContext {
            input_nets: vec![x],
            feedback_nets: vec![q],
            output_nets: vec![z],
        };
        let mut fsm = Fsm::new(1, 1, 1);
        let s0 = fsm
            .add_state("s0", vec![Logic::Zero], cover(&["0"]))
            .unwrap();
        let s1 = fsm.add_state("s1", vec![Logic::One], cover(&["1"])).unwrap();
        fsm.add_transition(s0, s1, cover(&["1"]), cover(&["1"]))
            .unwrap();
        // A single inverting element flips the output line, so the spliced
        // chain fails re-simulation against the declared output.
        let lib = CellLibrary::new(CellTemplate {
            name: "inv".to_string(),
            func: GateFn::Not,
            input_cap: 1.0,
            delay: DelayModel::Fixed {
                block_ns: 1.0,
                fanout_ns_per_load: 0.0,
            },
        });
        assert_eq!(elements_for_delay(1.0, &lib), 1);
        let sink = TraceSink::new();
        let gates_before = nl.gates.len();
        let nets_before = nl.nets.len();
        let err = insert_feedback_delays(&mut nl, &fsm, &ctx, &lib, &sink).unwrap_err();
        assert_eq!(err, HazardError::InsertionRejected { net: q.as_raw() });
        assert_eq!(nl.gates.len(), gates_before);
        assert_eq!(nl.nets.len(), nets_before);
        assert!(sink.has_errors());
    }

    #[test]
    fn clean_machine_needs_no_insertion() {
        let interner = Interner::new();
        let (mut nl, q) = small_netlist(&interner);
        let x = nl.nets.keys().next().unwrap();
        let ctx = HazardContext {
            input_nets: vec![x],
            feedback_nets: vec![q],
            output_nets: vec![q],
        };
        let mut fsm = Fsm::new(1, 1, 1);
        let s0 = fsm
            .add_state("s0", vec![Logic::Zero], cover(&["0"]))
            .unwrap();
        let s1 = fsm.add_state("s1", vec![Logic::One], cover(&["1"])).unwrap();
        fsm.add_transition(s0, s1, cover(&["1"]), cover(&["1"]))
            .unwrap();
        let lib = CellLibrary::standard();
        let sink = TraceSink::new();
        let gates_before = nl.gates.len();
        let report = insert_feedback_delays(&mut nl, &fsm, &ctx, &lib, &sink).unwrap();
        assert_eq!(report.required_delay_ns, vec![0.0]);
        assert_eq!(nl.gates.len(), gates_before);
    }
}
