//! Pin-pair delay models with clamped linear interpolation.
//!
//! A [`DelayModel`] describes the propagation and transition delay of one
//! input-to-output arc. Two forms exist: a fixed block delay with a
//! fanout-linear term, and characterized lookup tables indexed by input
//! slew and output load.

use serde::{Deserialize, Serialize};

/// A 1-D lookup table over output load, linearly interpolated.
///
/// Queries outside the axis range clamp to the edge values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table1d {
    /// Load breakpoints, strictly increasing.
    axis: Vec<f64>,
    /// One value per breakpoint.
    values: Vec<f64>,
}

impl Table1d {
    /// Creates a table from matching axis and value lists.
    ///
    /// # Panics
    ///
    /// Panics if the axis and value lists differ in length.
    pub fn new(axis: Vec<f64>, values: Vec<f64>) -> Self {
        assert_eq!(
            axis.len(),
            values.len(),
            "table axis and value lists differ in length"
        );
        Self { axis, values }
    }

    /// Samples the table at the given load.
    pub fn sample(&self, x: f64) -> f64 {
        sample_axis(&self.axis, &self.values, x)
    }
}

/// A 2-D lookup table over input slew (rows) and output load (columns),
/// bilinearly interpolated and clamped at the table edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table2d {
    /// Slew breakpoints, strictly increasing.
    slew_axis: Vec<f64>,
    /// Load breakpoints, strictly increasing.
    load_axis: Vec<f64>,
    /// One row per slew breakpoint, one column per load breakpoint.
    values: Vec<Vec<f64>>,
}

impl Table2d {
    /// Creates a table from its axes and row-major values.
    ///
    /// # Panics
    ///
    /// Panics if the row count differs from the slew axis or any row's
    /// length differs from the load axis.
    pub fn new(slew_axis: Vec<f64>, load_axis: Vec<f64>, values: Vec<Vec<f64>>) -> Self {
        assert_eq!(
            slew_axis.len(),
            values.len(),
            "table row count differs from the slew axis"
        );
        assert!(
            values.iter().all(|row| row.len() == load_axis.len()),
            "table row length differs from the load axis"
        );
        Self {
            slew_axis,
            load_axis,
            values,
        }
    }

    /// Samples the table at the given slew and load.
    pub fn sample(&self, slew: f64, load: f64) -> f64 {
        if self.slew_axis.is_empty() || self.load_axis.is_empty() {
            return 0.0;
        }
        let (lo, hi, t) = bracket(&self.slew_axis, slew);
        let row_lo = sample_axis(&self.load_axis, &self.values[lo], load);
        let row_hi = sample_axis(&self.load_axis, &self.values[hi], load);
        row_lo + (row_hi - row_lo) * t
    }
}

/// Delay characterization for one input-to-output pin pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DelayModel {
    /// A fixed block delay plus a term linear in the driven load.
    Fixed {
        /// Intrinsic delay in nanoseconds.
        block_ns: f64,
        /// Additional delay per unit of output load, in nanoseconds.
        fanout_ns_per_load: f64,
    },
    /// Characterized lookup tables.
    Tables {
        /// Propagation delay over (slew, load), nanoseconds.
        prop: Table2d,
        /// Output transition delay over load, nanoseconds.
        trans: Table1d,
    },
}

impl DelayModel {
    /// Propagation delay for the given input slew and output load.
    pub fn propagation_ns(&self, slew_ns: f64, load: f64) -> f64 {
        match self {
            DelayModel::Fixed {
                block_ns,
                fanout_ns_per_load,
            } => block_ns + fanout_ns_per_load * load,
            DelayModel::Tables { prop, .. } => prop.sample(slew_ns, load),
        }
    }

    /// Output transition (slew) delay for the given load.
    ///
    /// The fixed model has no transition term.
    pub fn transition_ns(&self, load: f64) -> f64 {
        match self {
            DelayModel::Fixed { .. } => 0.0,
            DelayModel::Tables { trans, .. } => trans.sample(load),
        }
    }

    /// Worst-case propagation delay at the given load, over all slews.
    pub fn worst_ns(&self, load: f64) -> f64 {
        match self {
            DelayModel::Fixed { .. } => self.propagation_ns(0.0, load),
            DelayModel::Tables { prop, .. } => prop
                .slew_axis
                .iter()
                .map(|&s| prop.sample(s, load))
                .fold(0.0, f64::max),
        }
    }

    /// Best-case propagation delay at the given load, over all slews.
    pub fn best_ns(&self, load: f64) -> f64 {
        match self {
            DelayModel::Fixed { .. } => self.propagation_ns(0.0, load),
            DelayModel::Tables { prop, .. } => prop
                .slew_axis
                .iter()
                .map(|&s| prop.sample(s, load))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// Linear interpolation of `values` over `axis` at `x`, clamped.
fn sample_axis(axis: &[f64], values: &[f64], x: f64) -> f64 {
    if axis.is_empty() {
        return 0.0;
    }
    let (lo, hi, t) = bracket(axis, x);
    values[lo] + (values[hi] - values[lo]) * t
}

/// Finds the bracketing breakpoints for `x` and the blend factor between
/// them. Clamps: before the first breakpoint returns (0, 0, 0), after the
/// last returns (n-1, n-1, 0).
fn bracket(axis: &[f64], x: f64) -> (usize, usize, f64) {
    let n = axis.len();
    if x <= axis[0] {
        return (0, 0, 0.0);
    }
    if x >= axis[n - 1] {
        return (n - 1, n - 1, 0.0);
    }
    let hi = axis.partition_point(|&b| b < x).min(n - 1);
    let lo = hi - 1;
    let span = axis[hi] - axis[lo];
    let t = if span > 0.0 { (x - axis[lo]) / span } else { 0.0 };
    (lo, hi, t)
}
