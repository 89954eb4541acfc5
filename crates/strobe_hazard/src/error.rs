//! Analyzer error taxonomy.
//!
//! Three families: structural (a residual cycle, or a propagated graph
//! error), convergence (the simulator's iteration budget, or the hazard
//! search cap), and consistency (a settled state that contradicts the FSM).
//! Nothing here retries; a failed pass aborts that synthesis step.

use strobe_common::Logic;
use strobe_cube::CubeError;
use strobe_graph::GraphError;
use strobe_netlist::NetlistError;
use strobe_sim::SimError;

/// Errors surfaced by the delay and hazard analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HazardError {
    /// The combinational view still contains a cycle after the declared
    /// feedback-register arcs were removed. The circuit cannot be timed.
    #[error("residual cycle remains after removing feedback-register arcs")]
    ResidualCycle,

    /// A simulated hazard transition settled into values that contradict
    /// the FSM's declared target. The circuit is provably wrong.
    #[error(
        "transition {transition}: net {net} settled to {found}, FSM declares {expected}"
    )]
    StateMismatch {
        /// Raw index of the FSM transition being verified.
        transition: u32,
        /// Raw index of the disagreeing net.
        net: u32,
        /// The value the FSM declares.
        expected: Logic,
        /// The value the circuit settled to.
        found: Logic,
    },

    /// The hazard search examined more candidate minterms than its cap.
    #[error("hazard search budget exhausted after {limit} candidate minterms")]
    SearchBudget {
        /// The configured candidate cap.
        limit: usize,
    },

    /// An inserted delay chain failed re-simulation and was rolled back.
    #[error("delay insertion on net {net} failed verification and was rolled back")]
    InsertionRejected {
        /// Raw index of the feedback net that was being delayed.
        net: u32,
    },

    /// A graph engine failure.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A simulator failure.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// A cube algebra failure.
    #[error(transparent)]
    Cube(#[from] CubeError),

    /// A netlist mutation failure.
    #[error(transparent)]
    Netlist(#[from] NetlistError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_cycle_display() {
        assert_eq!(
            HazardError::ResidualCycle.to_string(),
            "residual cycle remains after removing feedback-register arcs"
        );
    }

    #[test]
    fn state_mismatch_display() {
        let e = HazardError::StateMismatch {
            transition: 2,
            net: 7,
            expected: Logic::One,
            found: Logic::Zero,
        };
        assert_eq!(
            e.to_string(),
            "transition 2: net 7 settled to 0, FSM declares 1"
        );
    }

    #[test]
    fn search_budget_display() {
        let e = HazardError::SearchBudget { limit: 65536 };
        assert_eq!(
            e.to_string(),
            "hazard search budget exhausted after 65536 candidate minterms"
        );
    }

    #[test]
    fn wrapped_errors_pass_through() {
        let e: HazardError = GraphError::NoPath.into();
        assert_eq!(e.to_string(), GraphError::NoPath.to_string());
        let e: HazardError = SimError::UnknownPool { pool: 1 }.into();
        assert!(e.to_string().contains("pool"));
    }
}
