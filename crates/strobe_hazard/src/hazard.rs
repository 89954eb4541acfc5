//! Essential-hazard search by cube analysis and verifying simulation.
//!
//! For every FSM transition the search enumerates, through Boolean-cube
//! analysis rather than any graph walk, the input minterms one bit flip
//! away from the transition condition that the source state's stability
//! cover also accepts. Each such pair (stable input, firing input) is a
//! candidate essential hazard: the machine rests under the stable input,
//! and the single-bit change fires the transition while signals are still
//! in flight. Every candidate is replayed on the simulator; the settled
//! feedback and output values must match the FSM's declared target, and
//! the spread of settle times fixes the corrective delay each feedback
//! line needs.

use strobe_common::Logic;
use strobe_cube::{distance_one, EXPANSION_CAP};
use strobe_diagnostics::{TraceLevel, TraceMessage, TraceSink};
use strobe_fsm::{Fsm, FsmEdge, TransitionId};
use strobe_netlist::{NetId, Netlist};
use strobe_sim::{SimOptions, SimTime, Simulator};

use crate::error::HazardError;

const TAG: &str = "HAZARD";

/// Hard cap on candidate minterms examined per analysis.
pub const SEARCH_CAP: usize = EXPANSION_CAP;

/// Maps FSM variable numberings onto netlist nets.
#[derive(Debug, Clone)]
pub struct HazardContext {
    /// Net of each FSM input variable, in variable order.
    pub input_nets: Vec<NetId>,
    /// Net of each feedback variable, in variable order.
    pub feedback_nets: Vec<NetId>,
    /// Net of each output line, in line order.
    pub output_nets: Vec<NetId>,
}

/// The outcome of a hazard search.
#[derive(Debug, Clone)]
pub struct HazardReport {
    /// Candidate (stable, firing) minterm pairs examined.
    pub candidates_checked: usize,
    /// Minimum extra delay each feedback line needs, in nanoseconds.
    pub required_delay_ns: Vec<f64>,
}

/// Searches every FSM transition for essential hazards and sizes the
/// corrective delay per feedback line.
pub fn search_hazards(
    netlist: &Netlist<'_>,
    fsm: &Fsm,
    ctx: &HazardContext,
    sink: &TraceSink,
) -> Result<HazardReport, HazardError> {
    let width = fsm.input_count();
    let mut checked = 0usize;
    let mut worst_spread = 0.0f64;

    for (tid, edge) in fsm.transitions() {
        let stability = &fsm.state(edge.from).stability;
        for fire in edge.condition.expand_minterms()? {
            for stable in distance_one(fire, width) {
                if !stability.covers_minterm(stable) {
                    continue;
                }
                checked += 1;
                if checked > SEARCH_CAP {
                    return Err(HazardError::SearchBudget { limit: SEARCH_CAP });
                }
                sink.emit(TraceMessage::note(
                    TraceLevel::TRACE,
                    TAG,
                    format!(
                        "transition {}: candidate stable {stable:b} firing {fire:b}",
                        tid.as_raw()
                    ),
                ));
                let spread =
                    replay_candidate(netlist, fsm, ctx, sink, tid, edge, stable, fire)?;
                if spread > worst_spread {
                    worst_spread = spread;
                }
            }
        }
    }

    sink.emit(TraceMessage::result(
        TAG,
        format!(
            "checked {checked} hazard candidates, worst settle spread {worst_spread:.3} ns"
        ),
    ));
    Ok(HazardReport {
        candidates_checked: checked,
        required_delay_ns: vec![worst_spread; fsm.feedback_count()],
    })
}

/// Replays one candidate: settle the stable pre-state, fire the single-bit
/// change, verify the settled values, and measure the settle spread.
///
/// Each candidate gets a fresh simulator. A replay must start from a
/// pristine net state (every net at `X` until the pre-state is applied),
/// and carrying one session across candidates would leak the previous
/// candidate's settled values into the next pre-state. The spread is read
/// from per-net last-change times rather than the kernel's settle
/// matrices, which accumulate across an entire session and serve callers
/// that drive one simulator over a whole stimulus sequence.
#[allow(clippy::too_many_arguments)]
fn replay_candidate(
    netlist: &Netlist<'_>,
    fsm: &Fsm,
    ctx: &HazardContext,
    sink: &TraceSink,
    tid: TransitionId,
    edge: &FsmEdge,
    stable: u64,
    fire: u64,
) -> Result<f64, HazardError> {
    let mut sim = Simulator::new(netlist, sink, SimOptions::default());

    let source = fsm.state(edge.from);
    for (v, &net) in ctx.input_nets.iter().enumerate() {
        sim.set_net(net, Logic::from_bool(stable >> v & 1 == 1));
    }
    for (j, &net) in ctx.feedback_nets.iter().enumerate() {
        sim.set_net(net, source.code[j]);
    }
    sim.resolve_unknowns();

    // Settle the pre-state: replay the stable inputs through the queue so
    // any disagreement with the initial feedback values propagates.
    for (v, &net) in ctx.input_nets.iter().enumerate() {
        sim.schedule_event(
            SimTime::zero(),
            net,
            Logic::from_bool(stable >> v & 1 == 1),
            0.0,
            None,
            0,
        )?;
    }
    sim.drive()?;

    // Fire the hazard-triggering transition.
    let fire_time = sim.now().add_ns_f64(1.0);
    let flipped = stable ^ fire;
    for (v, &net) in ctx.input_nets.iter().enumerate() {
        if flipped >> v & 1 == 1 {
            sim.schedule_event(
                fire_time,
                net,
                Logic::from_bool(fire >> v & 1 == 1),
                0.0,
                None,
                0,
            )?;
        }
    }
    sim.drive()?;

    let target = fsm.state(edge.to);
    for (j, &net) in ctx.feedback_nets.iter().enumerate() {
        let expected = target.code[j];
        if expected == Logic::X {
            continue;
        }
        let found = sim.value(net);
        if found != expected {
            return Err(HazardError::StateMismatch {
                transition: tid.as_raw(),
                net: net.as_raw(),
                expected,
                found,
            });
        }
    }
    if let Some(declared) = edge.outputs.cubes.first() {
        for (k, &net) in ctx.output_nets.iter().enumerate() {
            let expected = declared.literal(k as u32);
            if expected == Logic::X {
                continue;
            }
            let found = sim.value(net);
            if found != expected {
                return Err(HazardError::StateMismatch {
                    transition: tid.as_raw(),
                    net: net.as_raw(),
                    expected,
                    found,
                });
            }
        }
    }

    // Settle spread across the feedback and output lines that moved.
    let mut earliest = f64::INFINITY;
    let mut latest = 0.0f64;
    let mut moved = 0;
    for &net in ctx.feedback_nets.iter().chain(ctx.output_nets.iter()) {
        let change = sim.last_change(net);
        if change >= fire_time {
            let at = change.since_ns(fire_time);
            earliest = earliest.min(at);
            latest = latest.max(at);
            moved += 1;
        }
    }
    Ok(if moved >= 2 { latest - earliest } else { 0.0 })
}
