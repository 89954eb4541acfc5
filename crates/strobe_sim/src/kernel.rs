//! The event-driven simulation kernel.
//!
//! [`Simulator`] replays gate-level signal propagation over a finished
//! netlist. Events live in a min-heap keyed by timestamp; equal timestamps
//! are processed in scheduling order, so a run over the same circuit and
//! stimulus is fully deterministic. The kernel is constructed at the start
//! of each analysis run and owned by it.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use strobe_common::Logic;
use strobe_diagnostics::{TraceMessage, TraceSink};
use strobe_netlist::{GateId, NetId, Netlist};

use crate::error::SimError;
use crate::time::SimTime;

const TAG: &str = "SIM";

/// A named pool of event timestamps.
///
/// Pools partition events by origin (stimulus, combinational fanout,
/// inserted delay chains) so the analyzer can read how far each category
/// has advanced.
#[derive(Debug, Clone)]
pub struct TimePool {
    /// Pool label.
    pub name: String,
    /// Timestamp of the most recently processed event in this pool.
    pub last: SimTime,
}

/// Per-run simulator options.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Hard cap on processed events per `drive` call.
    pub iteration_budget: u64,
    /// Accumulate switched capacitance and transition counts.
    pub accounting: bool,
    /// Halt `drive` once an event lands on a marked feedback-input net.
    pub stop_at_feedback: bool,
    /// Track worst-case settle delay per (stimulus net, watched net) pair.
    pub track_settle: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            iteration_budget: 100_000,
            accounting: false,
            stop_at_feedback: false,
            track_settle: false,
        }
    }
}

/// A scheduled value change. Immutable once queued.
#[derive(Debug, Clone)]
struct SimEvent {
    time: SimTime,
    /// FIFO tie-break for equal timestamps.
    seq: u64,
    net: NetId,
    value: Logic,
    slew_ns: f64,
    /// The gate whose output produced this event; `None` for external
    /// stimulus.
    driver: Option<GateId>,
    pool: usize,
}

impl PartialEq for SimEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for SimEvent {}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

/// The event-driven logic simulator.
pub struct Simulator<'n, 'i> {
    netlist: &'n Netlist<'i>,
    sink: &'n TraceSink,
    options: SimOptions,
    now: SimTime,
    next_seq: u64,
    queue: BinaryHeap<Reverse<SimEvent>>,
    values: Vec<Logic>,
    assigned: Vec<bool>,
    last_change: Vec<SimTime>,
    pools: Vec<TimePool>,
    feedback: Vec<bool>,
    watched: Vec<bool>,
    boundary_hit: Option<NetId>,
    /// The external stimulus most recently applied, with its time.
    stimulus: Option<(NetId, SimTime)>,
    settle: HashMap<(NetId, NetId), f64>,
    total_capacitance: f64,
    transition_count: u64,
}

impl<'n, 'i> Simulator<'n, 'i> {
    /// Creates a simulator over a finished netlist. Nets added to the
    /// netlist afterwards are not simulated.
    pub fn new(netlist: &'n Netlist<'i>, sink: &'n TraceSink, options: SimOptions) -> Self {
        let n = netlist.nets.len();
        Self {
            netlist,
            sink,
            options,
            now: SimTime::zero(),
            next_seq: 0,
            queue: BinaryHeap::new(),
            values: vec![Logic::X; n],
            assigned: vec![false; n],
            last_change: vec![SimTime::zero(); n],
            pools: vec![TimePool {
                name: "main".to_string(),
                last: SimTime::zero(),
            }],
            feedback: vec![false; n],
            watched: vec![false; n],
            boundary_hit: None,
            stimulus: None,
            settle: HashMap::new(),
            total_capacitance: 0.0,
            transition_count: 0,
        }
    }

    /// Adds a named time pool and returns its index. Pool 0 always exists.
    pub fn add_pool(&mut self, name: &str) -> usize {
        self.pools.push(TimePool {
            name: name.to_string(),
            last: SimTime::zero(),
        });
        self.pools.len() - 1
    }

    /// The timestamp of the most recently processed event in a pool.
    pub fn pool_time(&self, pool: usize) -> Option<SimTime> {
        self.pools.get(pool).map(|p| p.last)
    }

    /// Marks a net as an FSM feedback input for boundary stopping.
    pub fn mark_feedback_input(&mut self, net: NetId) {
        self.feedback[net.as_raw() as usize] = true;
    }

    /// Watches a net for settle-delay tracking.
    pub fn watch(&mut self, net: NetId) {
        self.watched[net.as_raw() as usize] = true;
    }

    /// The current simulated time. Never decreases.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The current value of a net.
    pub fn value(&self, net: NetId) -> Logic {
        self.values[net.as_raw() as usize]
    }

    /// The time of the last value change on a net.
    pub fn last_change(&self, net: NetId) -> SimTime {
        self.last_change[net.as_raw() as usize]
    }

    /// Total transitions counted so far (accounting runs only).
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Total switched capacitance so far (accounting runs only).
    pub fn total_capacitance(&self) -> f64 {
        self.total_capacitance
    }

    /// The feedback net the last `drive` call stopped on, if any.
    pub fn boundary_hit(&self) -> Option<NetId> {
        self.boundary_hit
    }

    /// Worst-case observed settle delay from a stimulus net to a watched
    /// net, in nanoseconds.
    pub fn settle_ns(&self, input: NetId, output: NetId) -> Option<f64> {
        self.settle.get(&(input, output)).copied()
    }

    /// Sets a net's value directly, outside the event queue. Used to
    /// establish initial conditions before a run.
    pub fn set_net(&mut self, net: NetId, value: Logic) {
        let i = net.as_raw() as usize;
        self.values[i] = value;
        self.assigned[i] = true;
    }

    /// Schedules a value change.
    ///
    /// A timestamp earlier than the current time is clamped to now and
    /// reported as a warning; simulated time never runs backwards.
    pub fn schedule_event(
        &mut self,
        time: SimTime,
        net: NetId,
        value: Logic,
        slew_ns: f64,
        driver: Option<GateId>,
        pool: usize,
    ) -> Result<(), SimError> {
        if pool >= self.pools.len() {
            return Err(SimError::UnknownPool { pool });
        }
        self.push_event(time, net, value, slew_ns, driver, pool);
        Ok(())
    }

    fn push_event(
        &mut self,
        mut time: SimTime,
        net: NetId,
        value: Logic,
        slew_ns: f64,
        driver: Option<GateId>,
        pool: usize,
    ) {
        if time < self.now {
            self.sink.emit(TraceMessage::warning(
                TAG,
                format!(
                    "event for net {} at {} clamped to current time {}",
                    net.as_raw(),
                    time,
                    self.now
                ),
            ));
            time = self.now;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(SimEvent {
            time,
            seq,
            net,
            value,
            slew_ns,
            driver,
            pool,
        }));
    }

    /// Pops and applies the earliest event. Returns the target net, or
    /// `None` if the queue is empty.
    ///
    /// A driven net's value is recomputed from its driver at processing
    /// time, so a freshly evaluated output overrides the value captured
    /// when the event was scheduled.
    pub fn process_next(&mut self) -> Option<NetId> {
        let Reverse(ev) = self.queue.pop()?;
        self.now = ev.time;
        self.pools[ev.pool].last = ev.time;

        let new_value = match self.netlist.driver_gate(ev.net) {
            Some(gate) => {
                let values = &self.values;
                self.netlist
                    .eval_gate(gate, |n| values[n.as_raw() as usize])
            }
            None => ev.value,
        };

        if ev.driver.is_none() {
            self.stimulus = Some((ev.net, ev.time));
        }

        let idx = ev.net.as_raw() as usize;
        if new_value == self.values[idx] && self.assigned[idx] {
            return Some(ev.net);
        }
        self.values[idx] = new_value;
        self.assigned[idx] = true;
        self.last_change[idx] = ev.time;

        if self.options.accounting {
            self.transition_count += 1;
            self.total_capacitance += self.netlist.net_load(ev.net);
        }
        if self.options.track_settle && self.watched[idx] {
            if let Some((src, t0)) = self.stimulus {
                let elapsed = ev.time.since_ns(t0);
                let entry = self.settle.entry((src, ev.net)).or_insert(0.0);
                if elapsed > *entry {
                    *entry = elapsed;
                }
            }
        }
        if self.options.stop_at_feedback && self.feedback[idx] {
            self.boundary_hit = Some(ev.net);
        }

        self.fan_out(&ev);
        Some(ev.net)
    }

    /// Schedules one downstream event per reader of the changed net. The
    /// scheduled value is advisory; the driver is re-evaluated when the
    /// event is processed.
    fn fan_out(&mut self, ev: &SimEvent) {
        let readers = self.netlist.readers(ev.net);
        for port_id in readers {
            let port = self.netlist.ports.get(port_id);
            let gate = port.gate;
            let Some(out_port) = self.netlist.output_port(gate) else {
                continue;
            };
            let Some(out_net) = self.netlist.ports.get(out_port).net else {
                continue;
            };
            let load = self.netlist.net_load(out_net);
            let (prop_ns, trans_ns) = match &port.delay {
                Some(model) => (
                    model.propagation_ns(ev.slew_ns, load),
                    model.transition_ns(load),
                ),
                None => (0.0, 0.0),
            };
            let values = &self.values;
            let out_value = self
                .netlist
                .eval_gate(gate, |n| values[n.as_raw() as usize]);
            let fire = self.now.add_ns_f64(prop_ns + ev.slew_ns);
            self.push_event(fire, out_net, out_value, trans_ns, Some(gate), ev.pool);
        }
    }

    /// Runs `process_next` until the queue empties, a marked feedback
    /// boundary is crossed, or the iteration budget runs out.
    pub fn drive(&mut self) -> Result<(), SimError> {
        self.boundary_hit = None;
        let budget = self.options.iteration_budget;
        let mut processed: u64 = 0;
        while let Some(net) = self.process_next() {
            processed += 1;
            if processed > budget {
                return Err(SimError::IterationLimit {
                    limit: budget,
                    net: net.as_raw(),
                });
            }
            if self.boundary_hit.is_some() {
                break;
            }
        }
        Ok(())
    }

    /// Forces every never-assigned or unknown driven net by evaluating its
    /// driver, to a fixed point. Each forcing is logged as an emergency
    /// assignment; a clean run logs nothing.
    pub fn resolve_unknowns(&mut self) {
        let net_count = self.values.len();
        // Each pass assigns at least one net or stops, so this terminates.
        for _ in 0..=net_count {
            let mut changed = false;
            for net in self.netlist.nets.keys() {
                let idx = net.as_raw() as usize;
                if idx >= net_count {
                    continue;
                }
                if self.values[idx] != Logic::X && self.assigned[idx] {
                    continue;
                }
                let Some(gate) = self.netlist.driver_gate(net) else {
                    continue;
                };
                let values = &self.values;
                let v = self
                    .netlist
                    .eval_gate(gate, |n| values[n.as_raw() as usize]);
                if v != Logic::X {
                    self.values[idx] = v;
                    self.assigned[idx] = true;
                    self.last_change[idx] = self.now;
                    self.sink.emit(TraceMessage::warning(
                        TAG,
                        format!("emergency assignment of net {} to {}", net.as_raw(), v),
                    ));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}
