/////////////////////////////////////////////////////////////////////////////////////////////
//
// Compares two concentration or surface matrices of equal shape.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{CalmapError, Result};
use calmap_utils::nan_sum;
use faer::Mat;
use serde::{Deserialize, Serialize};

/// How two matrices are compared cell by cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// `main - reference`.
    #[default]
    Absolute,

    /// `100 * (main - reference) / reference`; NaN where the reference is
    /// zero or NaN.
    Relative,
}

/// Cell-wise difference of `main` against `reference`.
///
/// # Example
/// ```
/// use calmap::{difference, DifferenceKind};
/// use faer::mat;
///
/// let main = mat![[30.0, 10.0]];
/// let reference = mat![[20.0, 0.0]];
///
/// let rel = difference(&main, &reference, DifferenceKind::Relative)?;
/// assert_eq!(rel[(0, 0)], 50.0);
/// assert!(rel[(0, 1)].is_nan());
/// # Ok::<(), calmap::CalmapError>(())
/// ```
pub fn difference(main: &Mat<f64>, reference: &Mat<f64>, kind: DifferenceKind) -> Result<Mat<f64>> {
    if main.nrows() != reference.nrows() {
        return Err(CalmapError::LengthMismatch {
            what: "difference rows",
            left: main.nrows(),
            right: reference.nrows(),
        });
    }
    if main.ncols() != reference.ncols() {
        return Err(CalmapError::LengthMismatch {
            what: "difference columns",
            left: main.ncols(),
            right: reference.ncols(),
        });
    }

    Ok(Mat::from_fn(main.nrows(), main.ncols(), |i, j| {
        let (a, b) = (main[(i, j)], reference[(i, j)]);
        match kind {
            DifferenceKind::Absolute => a - b,
            DifferenceKind::Relative if b == 0.0 || b.is_nan() => f64::NAN,
            DifferenceKind::Relative => 100.0 * (a - b) / b,
        }
    }))
}

/// Largest finite absolute value in `m`, or `None` when there is none.
///
/// Used as the symmetric range of a difference colour scale.
pub fn max_abs_finite(m: &Mat<f64>) -> Option<f64> {
    let mut best: Option<f64> = None;
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            let v = m[(i, j)].abs();
            if v.is_finite() && best.map_or(true, |b| v > b) {
                best = Some(v);
            }
        }
    }
    best
}

/// Rescales `m` so its non-NaN entries sum to 100.
///
/// Useful after [`OutOfRangePolicy::Exclude`](crate::config::OutOfRangePolicy)
/// when percentages were taken against a larger population. A matrix whose
/// sum is not positive is returned unchanged.
pub fn normalize_to_total(m: &Mat<f64>) -> Mat<f64> {
    let total = nan_sum(m);
    if total > 0.0 {
        Mat::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)] / total * 100.0)
    } else {
        m.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use faer::mat;

    #[test]
    fn absolute_difference_is_main_minus_reference() {
        let d = difference(
            &mat![[1.0, 5.0], [2.0, f64::NAN]],
            &mat![[3.0, 5.0], [0.0, 1.0]],
            DifferenceKind::Absolute,
        )
        .unwrap();
        assert_eq!(d[(0, 0)], -2.0);
        assert_eq!(d[(0, 1)], 0.0);
        assert_eq!(d[(1, 0)], 2.0);
        assert!(d[(1, 1)].is_nan());
    }

    #[test]
    fn relative_difference_skips_empty_reference() {
        let d = difference(
            &mat![[15.0, 4.0, 1.0]],
            &mat![[10.0, f64::NAN, 0.0]],
            DifferenceKind::Relative,
        )
        .unwrap();
        assert_eq!(d[(0, 0)], 50.0);
        assert!(d[(0, 1)].is_nan());
        assert!(d[(0, 2)].is_nan());
        assert_eq!(max_abs_finite(&d), Some(50.0));
    }

    #[test]
    fn shapes_must_agree() {
        let err = difference(&mat![[1.0, 2.0]], &mat![[1.0], [2.0]], DifferenceKind::Absolute)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn normalizing_rescales_to_one_hundred() {
        let m = normalize_to_total(&mat![[10.0, 30.0], [f64::NAN, 10.0]]);
        assert!((m[(0, 1)] - 60.0).abs() < 1e-12);
        assert!((nan_sum(&m) - 100.0).abs() < 1e-12);

        let zeros = Mat::<f64>::zeros(2, 2);
        assert_eq!(normalize_to_total(&zeros), zeros);
        assert_eq!(max_abs_finite(&Mat::<f64>::zeros(0, 0)), None);
    }
}
