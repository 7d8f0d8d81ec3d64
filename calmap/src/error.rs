/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error type returned by table, grid, interpolation, and overlay operations.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::error::Error;
use std::fmt;

/// Broad classification of a [`CalmapError`].
///
/// Every failure is local and synchronous: retrying without changing the
/// input yields the same error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Too few usable table points to build a model.
    InsufficientData,

    /// Inputs whose lengths or axis ordering do not line up.
    ShapeMismatch,

    /// Enough points, but no triangle can be formed from them.
    DegenerateInput,

    /// A configuration value outside its documented range.
    InvalidConfiguration,
}

/// Errors raised when inputs cannot be turned into a model or a result.
///
/// Per-sample conditions (NaN coordinates, queries outside the table) are
/// never reported through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum CalmapError {
    /// Fewer usable points than the operation requires.
    InsufficientData { found: usize, required: usize },

    /// Two sequences that must be the same length are not.
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// A grid axis with fewer than two values.
    AxisTooShort { axis: &'static str, len: usize },

    /// A grid axis that is not strictly increasing at `index`.
    AxisNotIncreasing { axis: &'static str, index: usize },

    /// All points collinear, or otherwise unable to form a triangle.
    DegenerateInput { reason: String },

    /// A configuration value outside `[min, max]`.
    InvalidConfiguration {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl CalmapError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalmapError::InsufficientData { .. } => ErrorKind::InsufficientData,
            CalmapError::LengthMismatch { .. }
            | CalmapError::AxisTooShort { .. }
            | CalmapError::AxisNotIncreasing { .. } => ErrorKind::ShapeMismatch,
            CalmapError::DegenerateInput { .. } => ErrorKind::DegenerateInput,
            CalmapError::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
        }
    }
}

impl fmt::Display for CalmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalmapError::InsufficientData { found, required } => write!(
                f,
                "insufficient data: found {} usable points, at least {} required",
                found, required
            ),
            CalmapError::LengthMismatch { what, left, right } => {
                write!(f, "length mismatch in {}: {} vs {}", what, left, right)
            }
            CalmapError::AxisTooShort { axis, len } => write!(
                f,
                "axis '{}' has {} values, at least 2 required",
                axis, len
            ),
            CalmapError::AxisNotIncreasing { axis, index } => write!(
                f,
                "axis '{}' is not strictly increasing at index {}",
                axis, index
            ),
            CalmapError::DegenerateInput { reason } => {
                write!(f, "degenerate input: {}", reason)
            }
            CalmapError::InvalidConfiguration {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "invalid configuration: {} = {} is outside [{}, {}]",
                field, value, min, max
            ),
        }
    }
}

impl Error for CalmapError {}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, CalmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_errors_share_a_kind() {
        let errs = [
            CalmapError::LengthMismatch { what: "samples", left: 3, right: 2 },
            CalmapError::AxisTooShort { axis: "x", len: 1 },
            CalmapError::AxisNotIncreasing { axis: "y", index: 4 },
        ];
        assert!(errs.iter().all(|e| e.kind() == ErrorKind::ShapeMismatch));
    }

    #[test]
    fn display_names_the_offending_field() {
        let err = CalmapError::InvalidConfiguration {
            field: "gamma",
            value: 4.0,
            min: 0.1,
            max: 3.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: gamma = 4 is outside [0.1, 3]"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
}
