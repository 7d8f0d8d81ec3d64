/////////////////////////////////////////////////////////////////////////////////////////////
//
// Bins log samples into grid cells and derives occupancy percentages and summary metrics.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    config::{AggregatorParams, OutOfRangePolicy},
    error::{CalmapError, Result},
    grid::Grid,
    progress::{report, ProgressMsg, ProgressSink},
    series::SampleSeries,
};
use calmap_utils::argmax;
use faer::Mat;
use rayon::prelude::*;
use std::sync::Arc;

/// Converts a cell percentage into hours of operation for a log of known length.
///
/// `assumed_total_duration_hours` is always supplied by the caller.
///
/// # Example
/// ```
/// use calmap::estimated_hours;
///
/// assert_eq!(estimated_hours(25.0, 8.0), 2.0);
/// ```
#[inline]
pub fn estimated_hours(percentage: f64, assumed_total_duration_hours: f64) -> f64 {
    percentage / 100.0 * assumed_total_duration_hours
}

/// Summary statistics of a [`Concentration`].
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// `false` when there were no valid samples; every other field is then zero.
    pub valid: bool,

    pub max_percentage: f64,

    /// `(row, col)` of the first cell holding `max_percentage`, in row-major order.
    pub max_cell: Option<(usize, usize)>,

    /// Mean percentage over every cell of the grid, empty cells included.
    pub average_percentage: f64,

    /// Sum of all cell percentages.
    pub total_percentage: f64,

    pub cells_with_data: usize,

    /// Share of cells with at least one sample, as a percentage.
    pub coverage: f64,
}

impl Metrics {
    fn empty() -> Self {
        Metrics {
            valid: false,
            max_percentage: 0.0,
            max_cell: None,
            average_percentage: 0.0,
            total_percentage: 0.0,
            cells_with_data: 0,
            coverage: 0.0,
        }
    }

    fn from_counts(counts: &[usize], percentages: &Mat<f64>, valid_samples: usize) -> Self {
        if valid_samples == 0 {
            return Self::empty();
        }
        let cols = percentages.ncols();
        let num_cells = counts.len();
        let flat: Vec<f64> = (0..num_cells)
            .map(|k| percentages[(k / cols, k % cols)])
            .collect();

        let max_cell = argmax(&flat).map(|k| (k / cols, k % cols));
        let max_percentage = max_cell.map_or(0.0, |(row, col)| percentages[(row, col)]);
        let total_percentage: f64 = flat.iter().sum();
        let cells_with_data = counts.iter().filter(|&&c| c > 0).count();

        Metrics {
            valid: true,
            max_percentage,
            max_cell,
            average_percentage: total_percentage / num_cells as f64,
            total_percentage,
            cells_with_data,
            coverage: 100.0 * cells_with_data as f64 / num_cells as f64,
        }
    }
}

/// Occupancy histogram of a sample series over a [`Grid`].
///
/// Rows index y and columns index x.
#[derive(Debug, Clone)]
pub struct Concentration {
    grid: Grid,
    counts: Vec<usize>,
    percentages: Mat<f64>,
    metrics: Metrics,
    valid_samples: usize,
    missing_samples: usize,
    points_outside: usize,
}

impl Concentration {
    /// Grid the samples were binned against.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Number of samples in cell `(row, col)`.
    pub fn count(&self, row: usize, col: usize) -> usize {
        self.counts[row * self.grid.cols() + col]
    }

    /// Sample counts as a `(rows × cols)` matrix.
    pub fn counts(&self) -> Mat<f64> {
        let (rows, cols) = self.shape();
        Mat::from_fn(rows, cols, |i, j| self.counts[i * cols + j] as f64)
    }

    /// `100 * count / valid_samples` per cell; all zero when nothing was binned.
    pub fn percentages(&self) -> &Mat<f64> {
        &self.percentages
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Samples that contributed to the histogram.
    pub fn valid_samples(&self) -> usize {
        self.valid_samples
    }

    /// Samples dropped because a coordinate was NaN.
    pub fn missing_samples(&self) -> usize {
        self.missing_samples
    }

    /// Samples dropped by [`OutOfRangePolicy::Exclude`]. Always zero under `Clamp`.
    pub fn points_outside(&self) -> usize {
        self.points_outside
    }

    /// Seconds of log spent outside the grid, for a log sampled every `raster` seconds.
    pub fn time_outside(&self, raster: f64) -> f64 {
        self.points_outside as f64 * raster
    }

    /// Hours spent in cell `(row, col)` for a log lasting `assumed_total_duration_hours`.
    pub fn estimated_hours(
        &self,
        row: usize,
        col: usize,
        assumed_total_duration_hours: f64,
    ) -> f64 {
        estimated_hours(self.percentages[(row, col)], assumed_total_duration_hours)
    }
}

/// Per-chunk counters merged after the parallel pass.
#[derive(Debug, Clone)]
struct Tally {
    counts: Vec<usize>,
    valid: usize,
    missing: usize,
    outside: usize,
}

impl Tally {
    fn new(num_cells: usize) -> Self {
        Tally {
            counts: vec![0; num_cells],
            valid: 0,
            missing: 0,
            outside: 0,
        }
    }

    fn merge(mut self, other: Tally) -> Tally {
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
        self.valid += other.valid;
        self.missing += other.missing;
        self.outside += other.outside;
        self
    }
}

/// Bins sample series into grid cells.
///
/// Stateless apart from its parameters: every call recomputes from scratch
/// and identical inputs give identical results regardless of chunking.
///
/// # Example
/// ```
/// use calmap::{ConcentrationAggregator, Grid, SampleSeries};
///
/// let grid = Grid::from_edges(vec![1000.0, 1250.0, 1500.0], vec![0.1, 0.175, 0.25])?;
/// let series = SampleSeries::new(
///     vec![1100.0, 1100.0, 1400.0, f64::NAN],
///     vec![0.12, 0.12, 0.2, 0.2],
/// )?;
///
/// let result = ConcentrationAggregator::new().compute(&series, &grid);
/// assert_eq!(result.count(0, 0), 2);
/// assert!((result.metrics().total_percentage - 100.0).abs() < 1e-9);
/// # Ok::<(), calmap::CalmapError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConcentrationAggregator {
    params: AggregatorParams,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl ConcentrationAggregator {
    /// Aggregator with [`AggregatorParams::default`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: AggregatorParams) -> Self {
        ConcentrationAggregator {
            params,
            progress_callback: None,
        }
    }

    /// Attaches a progress sink that receives a summary after every computation.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    pub fn params(&self) -> &AggregatorParams {
        &self.params
    }

    /// Cell of a valid sample, or `None` when the policy drops it.
    #[inline]
    fn cell_of(&self, grid: &Grid, x: f64, y: f64) -> Option<(usize, usize)> {
        if self.params.out_of_range == OutOfRangePolicy::Exclude && !grid.contains(x, y) {
            return None;
        }
        grid.locate(x, y)
    }

    fn tally(&self, series: &SampleSeries, grid: &Grid) -> Tally {
        let num_cells = grid.num_cells();
        let cols = grid.cols();
        let chunk = self.params.chunk_size.max(1);

        series
            .xs()
            .par_chunks(chunk)
            .zip(series.ys().par_chunks(chunk))
            .map(|(xs, ys)| {
                let mut tally = Tally::new(num_cells);
                for (&x, &y) in xs.iter().zip(ys) {
                    if x.is_nan() || y.is_nan() {
                        tally.missing += 1;
                        continue;
                    }
                    match self.cell_of(grid, x, y) {
                        Some((row, col)) => {
                            tally.counts[row * cols + col] += 1;
                            tally.valid += 1;
                        }
                        None => tally.outside += 1,
                    }
                }
                tally
            })
            .reduce(|| Tally::new(num_cells), Tally::merge)
    }

    fn finish(&self, tally: Tally, grid: &Grid) -> Concentration {
        let (rows, cols) = grid.shape();
        let valid = tally.valid;
        let percentages = if valid == 0 {
            Mat::zeros(rows, cols)
        } else {
            Mat::from_fn(rows, cols, |i, j| {
                100.0 * tally.counts[i * cols + j] as f64 / valid as f64
            })
        };
        let metrics = Metrics::from_counts(&tally.counts, &percentages, valid);

        report(
            &self.progress_callback,
            ProgressMsg::ConcentrationComputed {
                valid_samples: valid,
                missing_samples: tally.missing,
                outside_samples: tally.outside,
            },
        );

        Concentration {
            grid: grid.clone(),
            counts: tally.counts,
            percentages,
            metrics,
            valid_samples: valid,
            missing_samples: tally.missing,
            points_outside: tally.outside,
        }
    }

    /// Histogram of `series` over `grid`.
    ///
    /// NaN samples are skipped and excluded from the denominator. With no
    /// valid samples the result is all zero and `metrics().valid` is `false`.
    pub fn compute(&self, series: &SampleSeries, grid: &Grid) -> Concentration {
        let tally = self.tally(series, grid);
        self.finish(tally, grid)
    }

    /// Histogram over several logs at once.
    ///
    /// Raw counts are summed before percentages are taken, so the result
    /// equals [`compute`](Self::compute) over the concatenated series.
    pub fn compute_many(&self, series: &[SampleSeries], grid: &Grid) -> Concentration {
        let tally = series
            .iter()
            .map(|s| self.tally(s, grid))
            .fold(Tally::new(grid.num_cells()), Tally::merge);
        self.finish(tally, grid)
    }

    /// Mean of a third channel per cell, NaN where a cell received no samples.
    ///
    /// Samples with any NaN among `x`, `y` or `z` are skipped. Binning and
    /// the out-of-range policy are the same as for [`compute`](Self::compute).
    pub fn cell_average(
        &self,
        series: &SampleSeries,
        zs: &[f64],
        grid: &Grid,
    ) -> Result<Mat<f64>> {
        if zs.len() != series.len() {
            return Err(CalmapError::LengthMismatch {
                what: "cell average values",
                left: zs.len(),
                right: series.len(),
            });
        }

        let num_cells = grid.num_cells();
        let (rows, cols) = grid.shape();
        let chunk = self.params.chunk_size.max(1);

        let partials: Vec<(Vec<f64>, Vec<usize>)> = series
            .xs()
            .par_chunks(chunk)
            .zip(series.ys().par_chunks(chunk))
            .zip(zs.par_chunks(chunk))
            .map(|((xs, ys), zs)| {
                let mut sums = vec![0.0; num_cells];
                let mut counts = vec![0usize; num_cells];
                for ((&x, &y), &z) in xs.iter().zip(ys).zip(zs) {
                    if x.is_nan() || y.is_nan() || z.is_nan() {
                        continue;
                    }
                    if let Some((row, col)) = self.cell_of(grid, x, y) {
                        sums[row * cols + col] += z;
                        counts[row * cols + col] += 1;
                    }
                }
                (sums, counts)
            })
            .collect();

        // Summed in chunk order so the floating-point result does not depend on scheduling.
        let mut sums = vec![0.0; num_cells];
        let mut counts = vec![0usize; num_cells];
        for (s, c) in partials {
            for k in 0..num_cells {
                sums[k] += s[k];
                counts[k] += c[k];
            }
        }

        Ok(Mat::from_fn(rows, cols, |i, j| {
            let k = i * cols + j;
            if counts[k] == 0 {
                f64::NAN
            } else {
                sums[k] / counts[k] as f64
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::progress::closure_sink;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Mutex;

    fn scenario_grid() -> Grid {
        Grid::from_edges(vec![1000.0, 1250.0, 1500.0], vec![0.1, 0.175, 0.25]).unwrap()
    }

    fn random_series(n: usize, seed: u64) -> SampleSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        SampleSeries::from_pairs((0..n).map(|i| {
            if i % 17 == 0 {
                (f64::NAN, rng.random_range(0.0..1.0))
            } else {
                (rng.random_range(600.0..4200.0), rng.random_range(-0.1..1.1))
            }
        }))
    }

    #[test]
    fn four_sample_scenario() {
        let series = SampleSeries::new(
            vec![1100.0, 1100.0, 1400.0, f64::NAN],
            vec![0.12, 0.12, 0.2, 0.2],
        )
        .unwrap();
        let result = ConcentrationAggregator::new().compute(&series, &scenario_grid());

        assert_eq!(result.valid_samples(), 3);
        assert_eq!(result.missing_samples(), 1);
        assert_eq!(result.count(0, 0), 2);
        assert_eq!(result.count(1, 1), 1);

        let pct = result.percentages();
        assert!((pct[(0, 0)] - 66.666_666_666).abs() < 1e-6);
        assert!((pct[(1, 1)] - 33.333_333_333).abs() < 1e-6);
        assert_eq!(pct[(0, 1)], 0.0);

        let metrics = result.metrics();
        assert!(metrics.valid);
        assert!((metrics.total_percentage - 100.0).abs() < 1e-9);
        assert_eq!(metrics.max_cell, Some((0, 0)));
        assert!((metrics.average_percentage - 25.0).abs() < 1e-9);
        assert_eq!(metrics.cells_with_data, 2);
        assert_eq!(metrics.coverage, 50.0);
    }

    #[test]
    fn samples_on_and_beyond_the_last_edge_are_clamped() {
        let series = SampleSeries::from_pairs([(1500.0, 0.25), (9000.0, 5.0), (0.0, -3.0)]);
        let result = ConcentrationAggregator::new().compute(&series, &scenario_grid());
        assert_eq!(result.count(1, 1), 2);
        assert_eq!(result.count(0, 0), 1);
        assert_eq!(result.points_outside(), 0);
        assert!((result.metrics().total_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn exclude_policy_counts_outside_points() {
        let params = AggregatorParams {
            out_of_range: OutOfRangePolicy::Exclude,
            ..AggregatorParams::default()
        };
        let series = SampleSeries::from_pairs([(1500.0, 0.25), (9000.0, 5.0), (1100.0, 0.12)]);
        let result = ConcentrationAggregator::with_params(params).compute(&series, &scenario_grid());
        assert_eq!(result.valid_samples(), 2);
        assert_eq!(result.points_outside(), 1);
        assert_eq!(result.percentages()[(1, 1)], 50.0);
        assert_eq!(result.time_outside(0.01), 0.01);
    }

    #[test]
    fn zero_samples_give_an_invalid_empty_result() {
        let grid = scenario_grid();
        let empty = ConcentrationAggregator::new().compute(&SampleSeries::default(), &grid);
        assert!(!empty.metrics().valid);
        assert_eq!(empty.metrics().max_cell, None);
        assert_eq!(empty.percentages(), &Mat::<f64>::zeros(2, 2));

        let only_nan = SampleSeries::from_pairs([(f64::NAN, f64::NAN)]);
        let result = ConcentrationAggregator::new().compute(&only_nan, &grid);
        assert!(!result.metrics().valid);
        assert_eq!(result.missing_samples(), 1);
    }

    #[test]
    fn percentages_sum_to_one_hundred_for_random_logs() {
        let grid = Grid::uniform((800.0, 4000.0), (0.0, 1.0), 16, 10).unwrap();
        let series = random_series(5000, 11);
        let result = ConcentrationAggregator::new().compute(&series, &grid);
        let total: f64 = (0..10)
            .flat_map(|i| (0..16).map(move |j| (i, j)))
            .map(|(i, j)| result.percentages()[(i, j)])
            .sum();
        assert!((total - 100.0).abs() < 1e-6);
        assert_eq!(result.valid_samples(), series.valid_count());
    }

    #[test]
    fn chunking_does_not_change_counts() {
        let grid = Grid::from_centers(vec![1000.0, 1600.0, 2400.0, 3500.0], vec![0.1, 0.4, 0.9])
            .unwrap();
        let series = random_series(3000, 5);
        let coarse = ConcentrationAggregator::new().compute(&series, &grid);
        let fine = ConcentrationAggregator::with_params(AggregatorParams {
            chunk_size: 13,
            ..AggregatorParams::default()
        })
        .compute(&series, &grid);
        assert_eq!(coarse.counts(), fine.counts());
        assert_eq!(coarse.percentages(), fine.percentages());
        assert_eq!(coarse.metrics(), fine.metrics());
    }

    #[test]
    fn compute_many_matches_concatenation() {
        let grid = Grid::uniform((800.0, 4000.0), (0.0, 1.0), 8, 5).unwrap();
        let a = random_series(700, 1);
        let b = random_series(300, 2);
        let mut joined = a.clone();
        joined.extend_from(&b);

        let aggregator = ConcentrationAggregator::new();
        let many = aggregator.compute_many(&[a, b], &grid);
        let single = aggregator.compute(&joined, &grid);
        assert_eq!(many.counts(), single.counts());
        assert_eq!(many.percentages(), single.percentages());
        assert_eq!(many.valid_samples(), single.valid_samples());
    }

    #[test]
    fn cell_average_skips_empty_cells() {
        let series = SampleSeries::from_pairs([
            (1100.0, 0.12),
            (1200.0, 0.15),
            (1400.0, 0.2),
            (1100.0, f64::NAN),
        ]);
        let zs = [10.0, 20.0, 7.0, 99.0];
        let avg = ConcentrationAggregator::new()
            .cell_average(&series, &zs, &scenario_grid())
            .unwrap();
        assert_eq!(avg[(0, 0)], 15.0);
        assert_eq!(avg[(1, 1)], 7.0);
        assert!(avg[(0, 1)].is_nan());

        let err = ConcentrationAggregator::new()
            .cell_average(&series, &zs[..2], &scenario_grid())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn estimated_hours_scale_with_duration() {
        let series = SampleSeries::from_pairs([(1100.0, 0.12), (1400.0, 0.2), (1400.0, 0.2), (1400.0, 0.2)]);
        let result = ConcentrationAggregator::new().compute(&series, &scenario_grid());
        assert_eq!(result.estimated_hours(1, 1, 2.0), 1.5);
        assert_eq!(result.estimated_hours(0, 1, 2.0), 0.0);
    }

    #[test]
    fn summary_is_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = Arc::clone(&seen);
        let (sink, handle) = closure_sink(8, move |msg| seen_in_handler.lock().unwrap().push(msg));

        let series = SampleSeries::from_pairs([(1100.0, 0.12), (f64::NAN, 0.2)]);
        ConcentrationAggregator::new()
            .progress_callback(sink)
            .compute(&series, &scenario_grid());
        handle.join().unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ProgressMsg::ConcentrationComputed {
                valid_samples: 1,
                missing_samples: 1,
                outside_samples: 0,
            }]
        );
    }
}
