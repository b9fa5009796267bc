/*!
 * Core Types
 * Common types used across the simulator
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical time units (burst time, remaining time, quantum)
pub type TimeUnits = u32;

/// Resource units for memory and buffer accounting
///
/// Real-valued so proportional per-slice accounting never truncates
pub type Units = f64;

/// Priority level (1-10, lower is more important)
pub type Priority = u8;

/// Tolerance for resource equality and "exactly empty" comparisons
pub const EPSILON: Units = 1e-6;

/// Opaque process identifier
///
/// Assigned at creation, never reused while the record is in the table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pid {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// `a <= b` within [`EPSILON`]
#[inline]
pub fn approx_le(a: Units, b: Units) -> bool {
    a <= b + EPSILON
}

/// `|a - b| <= EPSILON`
#[inline]
pub fn approx_eq(a: Units, b: Units) -> bool {
    (a - b).abs() <= EPSILON
}

/// Clamp a resource level into `[0, capacity]`, snapping values within
/// [`EPSILON`] of either bound onto the bound itself
#[inline]
pub fn clamp_level(level: Units, capacity: Units) -> Units {
    if level <= EPSILON {
        0.0
    } else if level >= capacity - EPSILON {
        capacity
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_comparisons() {
        assert!(approx_le(1.0 + 1e-9, 1.0));
        assert!(!approx_le(1.1, 1.0));
        assert!(approx_eq(0.1 + 0.2, 0.3));
    }

    #[test]
    fn test_clamp_level_snaps_to_bounds() {
        assert_eq!(clamp_level(-1e-9, 100.0), 0.0);
        assert_eq!(clamp_level(100.0 + 1e-9, 100.0), 100.0);
        assert_eq!(clamp_level(42.5, 100.0), 42.5);
    }

    #[test]
    fn test_pid_display() {
        let pid = Pid::from("a1b2c3d4");
        assert_eq!(pid.to_string(), "a1b2c3d4");
        assert_eq!(pid.as_str(), "a1b2c3d4");
    }
}
