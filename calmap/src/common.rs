/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation, evaluation grids, and coordinate scaling.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::series::SampleSeries;
use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a matrix of random points in the unit square.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same sequence of points will be generated
///     deterministically across runs and platforms (useful for reproducible tests).
///   - If `None`, the generator is seeded from the operating system's randomness source.
///
/// # Returns
/// A `Mat<f64>` of shape `(n, 2)` where each element lies in `[0.0, 1.0)`.
///
/// # Example
/// ```
/// use calmap::generate_random_points;
///
/// let pts = generate_random_points(100, Some(42));
/// assert_eq!(pts.ncols(), 2);
/// ```
pub fn generate_random_points(n: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Mat::from_fn(n, 2, |_, _| rng.random_range(0.0..1.0))
}

/// Create the sample series for every node of a rectilinear grid.
///
/// `x` varies fastest, so sample `i * x_axis.len() + j` is
/// `(x_axis[j], y_axis[i])`, matching row-major order of a
/// `(y_axis.len() × x_axis.len())` matrix.
///
/// # Example
/// ```
/// use calmap::create_evaluation_grid;
///
/// let grid = create_evaluation_grid(&[0.0, 1.0, 2.0], &[10.0, 20.0]);
/// assert_eq!(grid.len(), 6);
/// assert_eq!(grid.xs()[4], 1.0);
/// assert_eq!(grid.ys()[4], 20.0);
/// ```
pub fn create_evaluation_grid(x_axis: &[f64], y_axis: &[f64]) -> SampleSeries {
    SampleSeries::from_pairs(
        y_axis
            .iter()
            .flat_map(|&y| x_axis.iter().map(move |&x| (x, y))),
    )
}

/// Reshapes row-major grid values into a `(rows × cols)` matrix.
pub(crate) fn reshape_row_major(values: &[f64], rows: usize, cols: usize) -> Mat<f64> {
    debug_assert_eq!(values.len(), rows * cols);
    Mat::from_fn(rows, cols, |i, j| values[i * cols + j])
}

/// Affine map of raw `(x, y)` coordinates onto the unit square of their extents.
///
/// RPM and ETASP differ by several orders of magnitude, so geometric
/// predicates are evaluated in scaled space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scaling {
    origin: [f64; 2],
    span: [f64; 2],
}

impl Scaling {
    /// Scaling for the bounding box `[xmin, ymin, xmax, ymax]`.
    pub(crate) fn from_extents(extents: [f64; 4]) -> Self {
        let span = |lo: f64, hi: f64| {
            let s = hi - lo;
            if s > 0.0 && s.is_finite() {
                s
            } else {
                1.0
            }
        };
        Scaling {
            origin: [extents[0], extents[1]],
            span: [span(extents[0], extents[2]), span(extents[1], extents[3])],
        }
    }

    #[inline]
    pub(crate) fn apply(&self, x: f64, y: f64) -> [f64; 2] {
        [
            (x - self.origin[0]) / self.span[0],
            (y - self.origin[1]) / self.span[1],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_points_are_reproducible() {
        let a = generate_random_points(20, Some(7));
        let b = generate_random_points(20, Some(7));
        assert_eq!(a, b);
        assert!((0..20).all(|i| (0.0..1.0).contains(&a[(i, 0)])));
    }

    #[test]
    fn grid_round_trips_through_reshape() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [5.0, 6.0];
        let grid = create_evaluation_grid(&xs, &ys);
        let m = reshape_row_major(grid.xs(), ys.len(), xs.len());
        assert_eq!(m[(1, 2)], 3.0);
        let m = reshape_row_major(grid.ys(), ys.len(), xs.len());
        assert_eq!(m[(1, 2)], 6.0);
    }

    #[test]
    fn scaling_maps_extents_to_unit_square() {
        let s = Scaling::from_extents([1000.0, 0.1, 1500.0, 0.2]);
        assert_eq!(s.apply(1000.0, 0.1), [0.0, 0.0]);
        let top = s.apply(1500.0, 0.2);
        assert!((top[0] - 1.0).abs() < 1e-15 && (top[1] - 1.0).abs() < 1e-12);

        // A flat axis is left unscaled rather than divided by zero.
        let flat = Scaling::from_extents([0.0, 2.0, 1.0, 2.0]);
        assert_eq!(flat.apply(0.5, 3.0), [0.5, 1.0]);
    }
}
