//! Boolean cube and cover algebra over a shared input-variable numbering.
//!
//! A [`Cube`] is a product term: each variable is constrained to 0,
//! constrained to 1, or left as a don't-care. A [`Cover`] is a list of
//! cubes interpreted as their union (sum of products). A **minterm** is a
//! fully specified assignment of all variables, packed into a `u64`.
//!
//! The essential-hazard search builds on this algebra, expanding covers to
//! minterms and walking distance-1 neighborhoods, to find input
//! changes that can steer an in-flight FSM transition through an unintended
//! third state.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;
use strobe_common::Logic;

/// Hard cap on the number of minterms produced by a single don't-care
/// expansion. Exhaustion is a reported failure of the enclosing analysis.
pub const EXPANSION_CAP: usize = 1 << 16;

/// Errors reported by cube operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CubeError {
    /// The variable numbering exceeds the packed-word width.
    #[error("cube supports at most 64 variables, got {0}")]
    TooManyVariables(u32),

    /// Cube widths disagree.
    #[error("cube width mismatch ({0} vs {1})")]
    WidthMismatch(u32, u32),

    /// Don't-care expansion would produce more than [`EXPANSION_CAP`] minterms.
    #[error("don't-care expansion of {free} free variables exceeds the cap")]
    ExpansionCap {
        /// The number of unconstrained variables in the cube.
        free: u32,
    },

    /// A cube literal string contained an invalid character.
    #[error("invalid cube literal character {0:?}")]
    BadLiteral(char),
}

/// A product term over `width` Boolean variables, packed into two bit rows.
///
/// Bit `i` of `care` is set when variable `i` is constrained; bit `i` of
/// `value` then holds the constraint. Value bits of don't-care variables
/// are kept at zero so equality and hashing stay canonical.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Cube {
    width: u32,
    care: u64,
    value: u64,
}

impl Cube {
    /// Creates the universal cube (all variables don't-care).
    pub fn universe(width: u32) -> Result<Self, CubeError> {
        if width > 64 {
            return Err(CubeError::TooManyVariables(width));
        }
        Ok(Self {
            width,
            care: 0,
            value: 0,
        })
    }

    /// Creates a cube from a literal string, variable 0 first.
    ///
    /// Accepts '0', '1', and '-'/'x'/'X' for don't-care.
    pub fn parse(s: &str) -> Result<Self, CubeError> {
        let mut cube = Self::universe(s.len() as u32)?;
        for (i, c) in s.chars().enumerate() {
            match c {
                '0' => cube = cube.with_literal(i as u32, false),
                '1' => cube = cube.with_literal(i as u32, true),
                '-' | 'x' | 'X' => {}
                other => return Err(CubeError::BadLiteral(other)),
            }
        }
        Ok(cube)
    }

    /// Creates the minterm cube for a packed assignment.
    pub fn from_minterm(minterm: u64, width: u32) -> Result<Self, CubeError> {
        if width > 64 {
            return Err(CubeError::TooManyVariables(width));
        }
        let care = mask(width);
        Ok(Self {
            width,
            care,
            value: minterm & care,
        })
    }

    /// Returns this cube with variable `var` constrained to `val`.
    pub fn with_literal(mut self, var: u32, val: bool) -> Self {
        debug_assert!(var < self.width);
        let bit = 1u64 << var;
        self.care |= bit;
        if val {
            self.value |= bit;
        } else {
            self.value &= !bit;
        }
        self
    }

    /// Returns the number of variables in the numbering.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the constraint on `var`: `Zero`, `One`, or `X` (don't-care).
    pub fn literal(&self, var: u32) -> Logic {
        let bit = 1u64 << var;
        if self.care & bit == 0 {
            Logic::X
        } else if self.value & bit != 0 {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Returns `true` if every variable is constrained.
    pub fn is_minterm(&self) -> bool {
        self.care == mask(self.width)
    }

    /// Intersects two cubes. `None` when they conflict on some literal
    /// (empty intersection).
    pub fn intersect(&self, other: &Cube) -> Result<Option<Cube>, CubeError> {
        if self.width != other.width {
            return Err(CubeError::WidthMismatch(self.width, other.width));
        }
        let both = self.care & other.care;
        if (self.value ^ other.value) & both != 0 {
            return Ok(None);
        }
        Ok(Some(Cube {
            width: self.width,
            care: self.care | other.care,
            value: self.value | other.value,
        }))
    }

    /// Returns `true` if this cube covers `other` (every assignment
    /// satisfying `other` satisfies `self`).
    pub fn contains(&self, other: &Cube) -> bool {
        self.width == other.width
            && self.care & other.care == self.care
            && (self.value ^ other.value) & self.care == 0
    }

    /// Returns `true` if the packed minterm lies inside this cube.
    pub fn covers_minterm(&self, minterm: u64) -> bool {
        (minterm ^ self.value) & self.care == 0
    }

    /// Cofactors this cube against an assignment of variable `var`.
    ///
    /// `None` when the cube constrains `var` to the opposite value; the
    /// cofactor otherwise, with `var` freed.
    pub fn cofactor(&self, var: u32, val: bool) -> Option<Cube> {
        match (self.literal(var), val) {
            (Logic::One, false) | (Logic::Zero, true) => None,
            _ => {
                let bit = 1u64 << var;
                Some(Cube {
                    width: self.width,
                    care: self.care & !bit,
                    value: self.value & !bit,
                })
            }
        }
    }

    /// Expands the don't-care variables into the full minterm list.
    ///
    /// The expansion width is capped; exceeding [`EXPANSION_CAP`] is a
    /// reported failure, not an unbounded loop.
    pub fn expand_minterms(&self) -> Result<Vec<u64>, CubeError> {
        let free_mask = mask(self.width) & !self.care;
        let free = free_mask.count_ones();
        if (1usize << free.min(63)) > EXPANSION_CAP {
            return Err(CubeError::ExpansionCap { free });
        }
        let free_bits: Vec<u64> = (0..self.width)
            .map(|v| 1u64 << v)
            .filter(|b| free_mask & b != 0)
            .collect();
        let mut minterms = Vec::with_capacity(1 << free);
        for combo in 0u64..(1u64 << free) {
            let mut m = self.value;
            for (i, bit) in free_bits.iter().enumerate() {
                if combo & (1 << i) != 0 {
                    m |= bit;
                }
            }
            minterms.push(m);
        }
        Ok(minterms)
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in 0..self.width {
            write!(f, "{}", self.literal(var))?;
        }
        Ok(())
    }
}

/// The minterms at Hamming distance 1 from `minterm` over `width` variables.
///
/// These are the single-bit-flip neighbors the essential-hazard search
/// probes: an input change arriving during an in-flight transition.
pub fn distance_one(minterm: u64, width: u32) -> Vec<u64> {
    (0..width).map(|v| minterm ^ (1u64 << v)).collect()
}

/// A sum-of-products cover: the union of its cubes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    /// The cubes of this cover.
    pub cubes: Vec<Cube>,
}

impl Cover {
    /// Creates an empty (always-false) cover.
    pub fn empty() -> Self {
        Self { cubes: Vec::new() }
    }

    /// Creates a cover from cubes.
    pub fn from_cubes(cubes: Vec<Cube>) -> Self {
        Self { cubes }
    }

    /// Returns `true` if no cube covers any assignment.
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Returns `true` if some cube covers the packed minterm.
    pub fn covers_minterm(&self, minterm: u64) -> bool {
        self.cubes.iter().any(|c| c.covers_minterm(minterm))
    }

    /// Intersects every cube with `other`, dropping empty intersections.
    pub fn intersect_cube(&self, other: &Cube) -> Result<Cover, CubeError> {
        let mut cubes = Vec::new();
        for cube in &self.cubes {
            if let Some(meet) = cube.intersect(other)? {
                cubes.push(meet);
            }
        }
        Ok(Cover { cubes })
    }

    /// Cofactors every cube against `var = val`, dropping conflicts.
    pub fn cofactor(&self, var: u32, val: bool) -> Cover {
        Cover {
            cubes: self
                .cubes
                .iter()
                .filter_map(|c| c.cofactor(var, val))
                .collect(),
        }
    }

    /// Expands the whole cover into the set of covered minterms,
    /// deduplicated, each cube capped individually.
    pub fn expand_minterms(&self) -> Result<Vec<u64>, CubeError> {
        let mut minterms: Vec<u64> = Vec::new();
        for cube in &self.cubes {
            minterms.extend(cube.expand_minterms()?);
        }
        minterms.sort_unstable();
        minterms.dedup();
        Ok(minterms)
    }
}

impl fmt::Display for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cube in &self.cubes {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{cube}")?;
            first = false;
        }
        Ok(())
    }
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}
