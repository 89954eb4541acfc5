//! Simulation time with femtosecond precision.
//!
//! [`SimTime`] is a plain femtosecond timestamp. Delay models are
//! characterized in fractional nanoseconds, so conversion helpers to and
//! from `f64` nanoseconds round to the nearest femtosecond.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;

/// A simulation time point with femtosecond resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    /// Simulation time in femtoseconds.
    pub fs: u64,
}

impl SimTime {
    /// Time zero.
    pub fn zero() -> Self {
        Self { fs: 0 }
    }

    /// Creates a time from a whole nanosecond value.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a time from a femtosecond value.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from fractional nanoseconds, rounded to the nearest
    /// femtosecond. Negative values clamp to zero.
    pub fn from_ns_f64(ns: f64) -> Self {
        let fs = (ns * FS_PER_NS as f64).round();
        Self {
            fs: if fs > 0.0 { fs as u64 } else { 0 },
        }
    }

    /// The timestamp in whole nanoseconds (truncated).
    pub fn to_ns(&self) -> u64 {
        self.fs / FS_PER_NS
    }

    /// The timestamp in fractional nanoseconds.
    pub fn as_ns_f64(&self) -> f64 {
        self.fs as f64 / FS_PER_NS as f64
    }

    /// This time advanced by a fractional-nanosecond delay.
    pub fn add_ns_f64(&self, ns: f64) -> Self {
        Self {
            fs: self.fs + Self::from_ns_f64(ns).fs,
        }
    }

    /// The elapsed fractional nanoseconds since `earlier`.
    pub fn since_ns(&self, earlier: SimTime) -> f64 {
        self.fs.saturating_sub(earlier.fs) as f64 / FS_PER_NS as f64
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")
        } else if fs >= FS_PER_US && fs.is_multiple_of(FS_PER_US) {
            write!(f, "{} us", fs / FS_PER_US)
        } else if fs >= FS_PER_NS && fs.is_multiple_of(FS_PER_NS) {
            write!(f, "{} ns", fs / FS_PER_NS)
        } else if fs >= FS_PER_PS && fs.is_multiple_of(FS_PER_PS) {
            write!(f, "{} ps", fs / FS_PER_PS)
        } else {
            write!(f, "{fs} fs")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time() {
        assert_eq!(SimTime::zero().fs, 0);
        assert_eq!(SimTime::default(), SimTime::zero());
    }

    #[test]
    fn from_ns_whole() {
        assert_eq!(SimTime::from_ns(10).fs, 10_000_000);
    }

    #[test]
    fn from_ns_f64_rounds() {
        assert_eq!(SimTime::from_ns_f64(1.5).fs, 1_500_000);
        assert_eq!(SimTime::from_ns_f64(0.0000004).fs, 0);
        assert_eq!(SimTime::from_ns_f64(-3.0).fs, 0);
    }

    #[test]
    fn ns_roundtrip() {
        let t = SimTime::from_ns_f64(2.25);
        assert!((t.as_ns_f64() - 2.25).abs() < 1e-9);
        assert_eq!(t.to_ns(), 2);
    }

    #[test]
    fn add_and_since() {
        let t = SimTime::from_ns(1).add_ns_f64(0.5);
        assert_eq!(t.fs, 1_500_000);
        assert!((t.since_ns(SimTime::from_ns(1)) - 0.5).abs() < 1e-9);
        // saturates rather than wrapping
        assert_eq!(SimTime::zero().since_ns(t), 0.0);
    }

    #[test]
    fn ordering() {
        assert!(SimTime::from_ns(1) < SimTime::from_ns(2));
        assert!(SimTime::from_fs(999_999) < SimTime::from_ns(1));
    }

    #[test]
    fn display_units() {
        assert_eq!(SimTime::zero().to_string(), "0 fs");
        assert_eq!(SimTime::from_ns(3).to_string(), "3 ns");
        assert_eq!(SimTime::from_fs(500_000).to_string(), "500 ps");
        assert_eq!(SimTime::from_fs(1_234).to_string(), "1234 fs");
        assert_eq!(SimTime::from_fs(2 * FS_PER_US).to_string(), "2 us");
    }

    #[test]
    fn serde_roundtrip() {
        let t = SimTime::from_fs(42_000);
        let json = serde_json::to_string(&t).unwrap();
        let back: SimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
