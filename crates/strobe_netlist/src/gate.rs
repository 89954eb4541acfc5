//! Gate logic functions with three-state evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;
use strobe_common::Logic;

/// The logic function computed by a gate node.
///
/// Evaluation is three-state: an unknown input yields an unknown output
/// unless the known inputs already force the result (e.g. a `0` into an
/// AND gate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateFn {
    /// Logical AND of all inputs.
    And,
    /// Logical OR of all inputs.
    Or,
    /// Negated AND.
    Nand,
    /// Negated OR.
    Nor,
    /// Single-input inversion.
    Not,
    /// Single-input identity.
    Buf,
    /// Exclusive OR of all inputs.
    Xor,
    /// Negated exclusive OR.
    Xnor,
    /// Identity function used for inserted delay elements. Logically a
    /// buffer; kept distinct so delay chains remain recognizable.
    DelayBuf,
}

impl GateFn {
    /// Evaluates the function over the given input values.
    ///
    /// A single-input function with no inputs evaluates to unknown.
    pub fn eval(self, inputs: &[Logic]) -> Logic {
        match self {
            GateFn::And => inputs.iter().fold(Logic::One, |acc, &v| acc & v),
            GateFn::Or => inputs.iter().fold(Logic::Zero, |acc, &v| acc | v),
            GateFn::Nand => !GateFn::And.eval(inputs),
            GateFn::Nor => !GateFn::Or.eval(inputs),
            GateFn::Not => match inputs.first() {
                Some(&v) => !v,
                None => Logic::X,
            },
            GateFn::Buf | GateFn::DelayBuf => match inputs.first() {
                Some(&v) => v,
                None => Logic::X,
            },
            GateFn::Xor => inputs.iter().fold(Logic::Zero, |acc, &v| acc ^ v),
            GateFn::Xnor => !GateFn::Xor.eval(inputs),
        }
    }

    /// Returns `true` for functions taking exactly one input.
    pub fn is_unary(self) -> bool {
        matches!(self, GateFn::Not | GateFn::Buf | GateFn::DelayBuf)
    }
}

impl fmt::Display for GateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateFn::And => "and",
            GateFn::Or => "or",
            GateFn::Nand => "nand",
            GateFn::Nor => "nor",
            GateFn::Not => "not",
            GateFn::Buf => "buf",
            GateFn::Xor => "xor",
            GateFn::Xnor => "xnor",
            GateFn::DelayBuf => "delay_buf",
        };
        f.write_str(s)
    }
}
