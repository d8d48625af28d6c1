//! Error types for grid, cube and search operations.

use thiserror::Error;

use crate::incidence::{Axis, Coord};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LatinError>;

/// Failures raised while building, walking or scoring Latin squares.
///
/// None of these are transient: each one means the input or the crate's own
/// invariants are broken, so callers should abandon the current target.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatinError {
    /// Grid or cube dimensions are inconsistent with the declared order.
    #[error("shape error: {message}")]
    Shape {
        /// What was wrong with the dimensions
        message: String,
    },

    /// A cube was converted back to a grid while not in the valid state.
    #[error("invalid incidence cube: {violations} violation(s) of the Latin property")]
    InvalidCube {
        /// Number of offending lines and entries found
        violations: usize,
    },

    /// A partner scan along one axis did not find the expected number of ones.
    #[error("partner scan along {axis:?} through {at:?} found {found}, expected {expected}")]
    NoPartner {
        /// Axis that was scanned
        axis: Axis,
        /// Cell the line passes through
        at: Coord,
        /// Number of unit entries found on the line
        found: usize,
        /// Number of unit entries the defect state requires
        expected: usize,
    },
}

impl LatinError {
    /// Create a Shape error.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create an InvalidCube error.
    pub fn invalid_cube(violations: usize) -> Self {
        Self::InvalidCube { violations }
    }

    /// Returns true for errors that point to a bug in the chain rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::NoPartner { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = LatinError::shape("expected 4 columns, found 3");
        assert_eq!(err.to_string(), "shape error: expected 4 columns, found 3");

        let err = LatinError::invalid_cube(2);
        assert!(err.to_string().contains("2 violation(s)"));
        assert!(!err.is_invariant_violation());
    }

    #[test]
    fn no_partner_is_an_invariant_violation() {
        let err = LatinError::NoPartner {
            axis: Axis::Row,
            at: Coord::new(0, 1, 2),
            found: 0,
            expected: 1,
        };
        assert!(err.is_invariant_violation());
        assert!(err.to_string().contains("found 0, expected 1"));
    }
}
