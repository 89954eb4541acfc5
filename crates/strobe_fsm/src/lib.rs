//! Asynchronous FSM model for the Strobe synthesis toolchain.
//!
//! States carry binary codes over the feedback variables and a stability
//! cover (the input conditions under which the state holds itself).
//! Transitions carry condition and output covers over a variable numbering
//! shared with `strobe_cube`. The hazard analyzer walks this model; it is
//! specified only to the depth that search needs.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use strobe_common::{define_arena_id, Arena, Logic};
use strobe_cube::Cover;

define_arena_id!(
    /// Opaque, copyable ID for an FSM state.
    StateId
);

define_arena_id!(
    /// Opaque, copyable ID for an FSM transition edge.
    TransitionId
);

/// Errors from FSM construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsmError {
    /// A state code's length differed from the machine's feedback width.
    #[error("state code width {found} does not match feedback width {expected}")]
    CodeWidthMismatch {
        /// The machine's feedback variable count.
        expected: usize,
        /// The offending code length.
        found: usize,
    },

    /// A cover was built over the wrong number of input variables.
    #[error("cover width {found} does not match input count {expected}")]
    CoverWidthMismatch {
        /// The machine's input variable count.
        expected: u32,
        /// The offending cube width.
        found: u32,
    },
}

/// An FSM state: a binary code plus its stability condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsmState {
    /// Human-readable state name.
    pub name: String,
    /// The binary code over the feedback variables.
    pub code: Vec<Logic>,
    /// The input conditions under which the machine rests in this state
    /// (the state's self-loop).
    pub stability: Cover,
}

/// A transition edge between two states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsmEdge {
    /// Source state.
    pub from: StateId,
    /// Destination state.
    pub to: StateId,
    /// Input conditions that fire this transition.
    pub condition: Cover,
    /// Output values asserted once the transition completes.
    pub outputs: Cover,
}

/// An asynchronous finite state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fsm {
    input_count: u32,
    feedback_count: usize,
    output_count: u32,
    states: Arena<StateId, FsmState>,
    edges: Arena<TransitionId, FsmEdge>,
}

impl Fsm {
    /// Creates an empty machine over the given variable numbering.
    pub fn new(input_count: u32, feedback_count: usize, output_count: u32) -> Self {
        Self {
            input_count,
            feedback_count,
            output_count,
            states: Arena::new(),
            edges: Arena::new(),
        }
    }

    /// Number of input variables (the cube width of every cover).
    pub fn input_count(&self) -> u32 {
        self.input_count
    }

    /// Number of feedback variables (the length of every state code).
    pub fn feedback_count(&self) -> usize {
        self.feedback_count
    }

    /// Number of output lines (the cube width of every output cover).
    pub fn output_count(&self) -> u32 {
        self.output_count
    }

    /// Adds a state, validating its code and stability cover widths.
    pub fn add_state(
        &mut self,
        name: &str,
        code: Vec<Logic>,
        stability: Cover,
    ) -> Result<StateId, FsmError> {
        if code.len() != self.feedback_count {
            return Err(FsmError::CodeWidthMismatch {
                expected: self.feedback_count,
                found: code.len(),
            });
        }
        self.check_cover(&stability, self.input_count)?;
        Ok(self.states.alloc(FsmState {
            name: name.to_string(),
            code,
            stability,
        }))
    }

    /// Adds a transition edge, validating its cover widths.
    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        condition: Cover,
        outputs: Cover,
    ) -> Result<TransitionId, FsmError> {
        self.check_cover(&condition, self.input_count)?;
        self.check_cover(&outputs, self.output_count)?;
        Ok(self.edges.alloc(FsmEdge {
            from,
            to,
            condition,
            outputs,
        }))
    }

    /// Returns a state by ID.
    pub fn state(&self, id: StateId) -> &FsmState {
        self.states.get(id)
    }

    /// Returns a transition by ID.
    pub fn transition(&self, id: TransitionId) -> &FsmEdge {
        self.edges.get(id)
    }

    /// Iterates over all states.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &FsmState)> {
        self.states.iter()
    }

    /// Iterates over all transitions.
    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &FsmEdge)> {
        self.edges.iter()
    }

    /// The transitions leaving a state, in declaration order.
    pub fn transitions_from(&self, state: StateId) -> Vec<TransitionId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.from == state)
            .map(|(id, _)| id)
            .collect()
    }

    fn check_cover(&self, cover: &Cover, expected: u32) -> Result<(), FsmError> {
        for cube in &cover.cubes {
            if cube.width() != expected {
                return Err(FsmError::CoverWidthMismatch {
                    expected,
                    found: cube.width(),
                });
            }
        }
        Ok(())
    }
}
