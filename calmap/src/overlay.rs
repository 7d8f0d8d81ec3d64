/////////////////////////////////////////////////////////////////////////////////////////////
//
// Turns a concentration histogram into a shaded surface or scatter overlay for display.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Rendering-oriented resampling of concentration histograms.
//!
//! [`recompute`] is the single entry point a display layer calls whenever the
//! concentration or the [`OverlaySettings`] change. It is a pure function of
//! its inputs: the same histogram, settings and seed always produce the same
//! surface and the same scatter points.

use crate::{
    concentration::Concentration,
    error::{ErrorKind, Result},
    interpolator::SurfaceInterpolator,
    kdtree::KDTree,
    overlay_config::{OverlayMode, OverlaySettings},
    surface_table::{SurfacePoint, SurfaceTable},
};
use calmap_utils::linspace;
use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One dot of a scatter overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,

    /// Marker size, scaled from [`OverlaySettings::scatter_size`] by the cell's shade.
    pub size: f64,

    /// Concentration percentage of the cell the point was drawn in.
    pub value: f64,
}

/// Display-ready overlay produced by [`recompute`].
///
/// All matrices are `(y_axis.len() × x_axis.len())`.
#[derive(Debug, Clone)]
pub struct RenderableSurface {
    pub mode: OverlayMode,

    /// Sample positions of the resampled surface along x.
    pub x_axis: Vec<f64>,

    /// Sample positions of the resampled surface along y.
    pub y_axis: Vec<f64>,

    /// Resampled concentration, after blurring when enabled.
    pub values: Mat<f64>,

    /// Shade in `[0, 1]` after normalisation, intensity and gamma.
    pub intensity: Mat<f64>,

    /// Opacity in `[0, 1]`: `intensity * (1 - transparency)`.
    pub alpha: Mat<f64>,

    /// Scatter points; empty in gradient mode.
    pub scatter: Vec<ScatterPoint>,

    /// Largest value of `values`, the reference for normalisation.
    pub max_value: f64,
}

/// Maps a concentration onto a shade in `[0, 1]`.
///
/// `clip(value / max_value, 0, 1)`, then `clip(· * intensity, 0, 1)`, then
/// raised to `gamma`. Non-decreasing in `value` for any positive intensity
/// and gamma. A non-positive `max_value` or a NaN `value` shades as zero.
///
/// # Example
/// ```
/// use calmap::shade;
///
/// assert_eq!(shade(50.0, 100.0, 1.0, 1.0), 0.5);
/// assert_eq!(shade(50.0, 100.0, 3.0, 1.0), 1.0);
/// assert_eq!(shade(25.0, 100.0, 1.0, 2.0), 0.0625);
/// ```
#[inline]
pub fn shade(value: f64, max_value: f64, intensity: f64, gamma: f64) -> f64 {
    if !(max_value > 0.0) || value.is_nan() {
        return 0.0;
    }
    let normalized = (value / max_value).clamp(0.0, 1.0);
    let scaled = (normalized * intensity).clamp(0.0, 1.0);
    scaled.powf(gamma)
}

/// `(n - 1) * factor + 1` evenly spaced samples spanning `centers`.
fn refine_axis(centers: &[f64], factor: usize) -> Vec<f64> {
    match (centers.first(), centers.last()) {
        (Some(&first), Some(&last)) if centers.len() > 1 => {
            linspace(first, last, (centers.len() - 1) * factor + 1)
        }
        _ => centers.to_vec(),
    }
}

/// Resamples cell-centre values onto a finer rectilinear grid.
///
/// Uses the two-pass interpolator; when the centres cannot be triangulated
/// (fewer than three cells, or a single row or column) every sample takes
/// the value of its nearest centre.
fn resample_centers(
    x_centers: &[f64],
    y_centers: &[f64],
    percentages: &Mat<f64>,
    x_axis: &[f64],
    y_axis: &[f64],
) -> Result<Mat<f64>> {
    let points: Vec<SurfacePoint> = y_centers
        .iter()
        .enumerate()
        .flat_map(|(i, &y)| {
            x_centers
                .iter()
                .enumerate()
                .map(move |(j, &x)| SurfacePoint::new(x, y, percentages[(i, j)]))
        })
        .collect();

    let model = SurfaceTable::new(points.clone()).and_then(SurfaceInterpolator::build);
    match model {
        Ok(model) => Ok(model.resample(x_axis, y_axis)),
        Err(e) if matches!(e.kind(), ErrorKind::InsufficientData | ErrorKind::DegenerateInput) => {
            let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
            let tree = KDTree::new(&coords);
            Ok(Mat::from_fn(y_axis.len(), x_axis.len(), |i, j| {
                tree.nearest([x_axis[j], y_axis[i]])
                    .map_or(f64::NAN, |(id, _)| points[id].z)
            }))
        }
        Err(e) => Err(e),
    }
}

/// Normalised Gaussian weights covering three standard deviations.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (3.0 * sigma).ceil() as i64;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|k| (-((k * k) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Separable Gaussian blur with edge samples repeated beyond the border.
fn gaussian_blur(values: &Mat<f64>, sigma: f64) -> Mat<f64> {
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i64;
    let (rows, cols) = (values.nrows(), values.ncols());
    let clamp = |idx: i64, len: usize| idx.clamp(0, len as i64 - 1) as usize;

    let horizontal: Mat<f64> = Mat::from_fn(rows, cols, |i, j| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * values[(i, clamp(j as i64 + k as i64 - radius, cols))])
            .sum::<f64>()
    });
    Mat::from_fn(rows, cols, |i, j| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * horizontal[(clamp(i as i64 + k as i64 - radius, rows), j)])
            .sum::<f64>()
    })
}

fn max_finite(values: &Mat<f64>) -> f64 {
    let mut max = 0.0_f64;
    for j in 0..values.ncols() {
        for i in 0..values.nrows() {
            let v = values[(i, j)];
            if v.is_finite() && v > max {
                max = v;
            }
        }
    }
    max
}

/// Seeded random dots inside each cell, `round(percentage * scatter_density)` per cell.
fn scatter_points(concentration: &Concentration, settings: &OverlaySettings) -> Vec<ScatterPoint> {
    let grid = concentration.grid();
    let percentages = concentration.percentages();
    let max_pct = concentration.metrics().max_percentage;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut points = Vec::new();

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pct = percentages[(row, col)];
            let count = (pct * settings.scatter_density).round();
            if !(count >= 1.0) {
                continue;
            }
            let Some([xmin, ymin, xmax, ymax]) = grid.cell_bounds(row, col) else {
                continue;
            };
            let cell_shade = shade(pct, max_pct, settings.intensity, settings.gamma);
            let size = settings.scatter_size * (0.5 + 0.5 * cell_shade);
            for _ in 0..count as usize {
                points.push(ScatterPoint {
                    x: rng.random_range(xmin..xmax),
                    y: rng.random_range(ymin..ymax),
                    size,
                    value: pct,
                });
            }
        }
    }
    points
}

/// Builds the overlay for `concentration` under `settings`.
///
/// Fails only when `settings` is outside its documented ranges.
///
/// # Example
/// ```
/// use calmap::{recompute, ConcentrationAggregator, Grid, OverlaySettings, SampleSeries};
///
/// let grid = Grid::uniform((1000.0, 3000.0), (0.0, 1.0), 4, 4)?;
/// let series = SampleSeries::from_pairs([(1200.0, 0.1), (1300.0, 0.2), (2800.0, 0.9)]);
/// let concentration = ConcentrationAggregator::new().compute(&series, &grid);
///
/// let overlay = recompute(&concentration, &OverlaySettings::default())?;
/// assert_eq!(overlay.x_axis.len(), 3 * 4 + 1);
/// assert!(overlay.scatter.is_empty());
/// # Ok::<(), calmap::CalmapError>(())
/// ```
pub fn recompute(
    concentration: &Concentration,
    settings: &OverlaySettings,
) -> Result<RenderableSurface> {
    settings.validate()?;

    let grid = concentration.grid();
    let x_centers = grid.x_centers();
    let y_centers = grid.y_centers();
    let x_axis = refine_axis(&x_centers, settings.upsample);
    let y_axis = refine_axis(&y_centers, settings.upsample);

    let mut values = resample_centers(
        &x_centers,
        &y_centers,
        concentration.percentages(),
        &x_axis,
        &y_axis,
    )?;
    if settings.blur_enabled {
        values = gaussian_blur(&values, 0.5 * settings.upsample as f64);
    }

    let max_value = max_finite(&values);
    let intensity = Mat::from_fn(values.nrows(), values.ncols(), |i, j| {
        shade(values[(i, j)], max_value, settings.intensity, settings.gamma)
    });
    let opacity = 1.0 - settings.transparency;
    let alpha = Mat::from_fn(values.nrows(), values.ncols(), |i, j| {
        intensity[(i, j)] * opacity
    });

    let scatter = match settings.mode {
        OverlayMode::Gradient => Vec::new(),
        OverlayMode::Scatter => scatter_points(concentration, settings),
    };

    Ok(RenderableSurface {
        mode: settings.mode,
        x_axis,
        y_axis,
        values,
        intensity,
        alpha,
        scatter,
        max_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concentration::ConcentrationAggregator;
    use crate::grid::Grid;
    use crate::series::SampleSeries;

    fn concentration_on(grid: &Grid, samples: &[(f64, f64)]) -> Concentration {
        let series = SampleSeries::from_pairs(samples.iter().copied());
        ConcentrationAggregator::new().compute(&series, grid)
    }

    fn two_by_two() -> Concentration {
        let grid = Grid::from_edges(vec![0.0, 2.0, 4.0], vec![0.0, 1.0, 2.0]).unwrap();
        concentration_on(
            &grid,
            &[(1.0, 0.5), (1.0, 0.5), (1.0, 0.5), (3.0, 0.5), (3.0, 1.5)],
        )
    }

    #[test]
    fn shade_is_monotone() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let intensity = rng.random_range(0.1..3.0);
            let gamma = rng.random_range(0.1..3.0);
            let mut previous = 0.0;
            for k in 0..=120 {
                let s = shade(k as f64, 100.0, intensity, gamma);
                assert!(s >= previous && (0.0..=1.0).contains(&s));
                previous = s;
            }
        }
        assert_eq!(shade(f64::NAN, 10.0, 1.0, 1.0), 0.0);
        assert_eq!(shade(5.0, 0.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn surface_matches_cell_values_at_centres() {
        let concentration = two_by_two();
        let settings = OverlaySettings {
            upsample: 1,
            transparency: 0.5,
            ..OverlaySettings::default()
        };
        let overlay = recompute(&concentration, &settings).unwrap();

        assert_eq!(overlay.x_axis, vec![1.0, 3.0]);
        assert_eq!(overlay.y_axis, vec![0.5, 1.5]);
        assert!((overlay.values[(0, 0)] - 60.0).abs() < 1e-9);
        assert!((overlay.values[(0, 1)] - 20.0).abs() < 1e-9);
        assert!(overlay.values[(1, 0)].abs() < 1e-9);
        assert!((overlay.max_value - 60.0).abs() < 1e-9);
        assert!((overlay.intensity[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((overlay.alpha[(0, 0)] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn upsampled_surface_stays_between_neighbours() {
        let overlay = recompute(&two_by_two(), &OverlaySettings::default()).unwrap();
        assert_eq!(overlay.values.nrows(), 5);
        assert_eq!(overlay.values.ncols(), 5);
        // Halfway along the bottom row, between 60 % and 20 %.
        assert!((overlay.values[(0, 2)] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn single_row_falls_back_to_nearest_centre() {
        let grid = Grid::from_edges(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0]).unwrap();
        let concentration = concentration_on(&grid, &[(0.5, 0.5), (2.5, 0.5), (2.5, 0.5)]);
        let settings = OverlaySettings {
            upsample: 2,
            ..OverlaySettings::default()
        };
        let overlay = recompute(&concentration, &settings).unwrap();

        assert_eq!(overlay.y_axis, vec![0.5]);
        assert_eq!(overlay.x_axis.len(), 5);
        let row: Vec<f64> = (0..5).map(|j| overlay.values[(0, j)]).collect();
        // x = 1.0 is equidistant from the first two centres and takes the first.
        assert!((row[0] - 100.0 / 3.0).abs() < 1e-9);
        assert!((row[1] - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(row[2], 0.0);
        assert!((row[4] - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn blur_smooths_a_peak_and_keeps_flat_surfaces() {
        let grid = Grid::uniform((0.0, 5.0), (0.0, 5.0), 5, 5).unwrap();
        let peak = concentration_on(&grid, &[(2.5, 2.5)]);
        let settings = OverlaySettings {
            blur_enabled: true,
            upsample: 2,
            ..OverlaySettings::default()
        };
        let blurred = recompute(&peak, &settings).unwrap();
        let sharp = recompute(&peak, &OverlaySettings { blur_enabled: false, ..settings }).unwrap();
        assert!(blurred.max_value < sharp.max_value);
        assert!(blurred.values[(3, 3)] > 0.0 && blurred.values[(0, 3)] > 0.0);

        let everywhere: Vec<(f64, f64)> = (0..5)
            .flat_map(|i| (0..5).map(move |j| (j as f64 + 0.5, i as f64 + 0.5)))
            .collect();
        let flat = recompute(&concentration_on(&grid, &everywhere), &settings).unwrap();
        assert!((0..9).all(|i| (flat.values[(i, 4)] - 4.0).abs() < 1e-9));
    }

    #[test]
    fn blur_spreads_a_spike_symmetrically() {
        let spike = Mat::from_fn(1, 5, |_, j| if j == 2 { 1.0 } else { 0.0 });
        let blurred = gaussian_blur(&spike, 0.5);

        let total: f64 = (0..5).map(|j| blurred[(0, j)]).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((blurred[(0, 1)] - blurred[(0, 3)]).abs() < 1e-12);
        assert!(blurred[(0, 2)] > blurred[(0, 1)] && blurred[(0, 1)] > blurred[(0, 0)]);
    }

    #[test]
    fn scatter_is_reproducible_and_stays_in_cells() {
        let concentration = two_by_two();
        let settings = OverlaySettings::builder(OverlayMode::Scatter)
            .scatter_density(0.5)
            .seed(7)
            .build()
            .unwrap();

        let first = recompute(&concentration, &settings).unwrap();
        let second = recompute(&concentration, &settings).unwrap();
        assert_eq!(first.scatter, second.scatter);
        // 60 % -> 30 points, 20 % -> 10 points, 20 % -> 10 points.
        assert_eq!(first.scatter.len(), 50);
        for p in &first.scatter {
            let (row, col) = concentration.grid().locate(p.x, p.y).unwrap();
            assert_eq!(p.value, concentration.percentages()[(row, col)]);
        }
        let biggest = first.scatter.iter().map(|p| p.size).fold(0.0, f64::max);
        assert_eq!(biggest, settings.scatter_size);

        let reseeded = OverlaySettings { seed: 8, ..settings };
        let other = recompute(&concentration, &reseeded).unwrap();
        assert_eq!(other.scatter.len(), 50);
        assert_ne!(other.scatter, first.scatter);
    }

    #[test]
    fn empty_histogram_gives_a_blank_overlay() {
        let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 3, 3).unwrap();
        let empty = ConcentrationAggregator::new().compute(&SampleSeries::default(), &grid);
        let settings = OverlaySettings {
            mode: OverlayMode::Scatter,
            ..OverlaySettings::default()
        };
        let overlay = recompute(&empty, &settings).unwrap();
        assert_eq!(overlay.max_value, 0.0);
        assert!(overlay.scatter.is_empty());
        assert!((0..overlay.alpha.nrows()).all(|i| overlay.alpha[(i, 0)] == 0.0));
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let settings = OverlaySettings {
            gamma: 0.0,
            ..OverlaySettings::default()
        };
        let err = recompute(&two_by_two(), &settings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
}
