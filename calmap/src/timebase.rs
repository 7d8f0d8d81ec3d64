/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides helpers for putting independently sampled log channels on a common time base.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Channel synchronisation helpers.
//!
//! Log channels are recorded at their own rates. Before samples can be paired
//! into a [`SampleSeries`] they are resampled onto one evenly spaced time base
//! covering the window where every channel has data.

use crate::error::{CalmapError, Result};
use crate::series::SampleSeries;
use calmap_utils::{argmax, arange, format_hms};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raster used when no channel provides sampling information.
pub const DEFAULT_RASTER: f64 = 0.001;

/// Behaviour of [`resample_linear`] for targets outside the recorded interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Hold the first or last recorded sample.
    #[default]
    Clamp,

    /// Continue the line through the two outermost samples.
    Linear,
}

/// Evenly spaced times `start, start + raster, ...` strictly below `end`.
///
/// # Example
/// ```
/// use calmap::common_time_base;
///
/// let times = common_time_base(0.0, 0.1, 0.02)?;
/// assert_eq!(times.len(), 5);
/// assert!(common_time_base(0.0, 1.0, 0.0).is_err());
/// # Ok::<(), calmap::CalmapError>(())
/// ```
pub fn common_time_base(start: f64, end: f64, raster: f64) -> Result<Vec<f64>> {
    if !(raster > 0.0) || !raster.is_finite() {
        return Err(CalmapError::InvalidConfiguration {
            field: "raster",
            value: raster,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        });
    }
    Ok(arange(start, end, raster))
}

/// Interval `[latest first timestamp, earliest last timestamp]` shared by all
/// channels, or `None` when a channel is empty or the channels do not overlap.
pub fn overlap_window(channels: &[&[f64]]) -> Option<(f64, f64)> {
    if channels.is_empty() {
        return None;
    }
    let mut start = f64::NEG_INFINITY;
    let mut end = f64::INFINITY;
    for timestamps in channels {
        let (first, last) = (timestamps.first()?, timestamps.last()?);
        start = start.max(*first);
        end = end.min(*last);
    }
    (start <= end).then_some((start, end))
}

fn check_non_decreasing(timestamps: &[f64]) -> Result<()> {
    match timestamps
        .windows(2)
        .position(|w| !(w[1] >= w[0]))
    {
        Some(index) => Err(CalmapError::AxisNotIncreasing {
            axis: "timestamps",
            index: index + 1,
        }),
        None => Ok(()),
    }
}

#[inline]
fn lerp(t0: f64, v0: f64, t1: f64, v1: f64, t: f64) -> f64 {
    if t1 == t0 {
        return v0;
    }
    v0 + (t - t0) * (v1 - v0) / (t1 - t0)
}

/// Piecewise-linear resampling of a recorded channel at `targets`.
///
/// `timestamps` must be non-decreasing. NaN targets give NaN, and an empty
/// channel gives NaN everywhere.
///
/// # Example
/// ```
/// use calmap::{resample_linear, Extrapolation};
///
/// let t = [0.0, 1.0, 2.0];
/// let v = [0.0, 10.0, 30.0];
///
/// let held = resample_linear(&t, &v, &[0.5, 3.0], Extrapolation::Clamp)?;
/// assert_eq!(held, vec![5.0, 30.0]);
///
/// let extended = resample_linear(&t, &v, &[3.0], Extrapolation::Linear)?;
/// assert_eq!(extended, vec![50.0]);
/// # Ok::<(), calmap::CalmapError>(())
/// ```
pub fn resample_linear(
    timestamps: &[f64],
    samples: &[f64],
    targets: &[f64],
    extrapolation: Extrapolation,
) -> Result<Vec<f64>> {
    if timestamps.len() != samples.len() {
        return Err(CalmapError::LengthMismatch {
            what: "channel timestamps and samples",
            left: timestamps.len(),
            right: samples.len(),
        });
    }
    check_non_decreasing(timestamps)?;

    let n = timestamps.len();
    if n == 0 {
        return Ok(vec![f64::NAN; targets.len()]);
    }
    let (first, last) = (timestamps[0], timestamps[n - 1]);

    Ok(targets
        .iter()
        .map(|&t| {
            if t.is_nan() {
                return f64::NAN;
            }
            if n == 1 {
                return samples[0];
            }
            if t <= first {
                return match extrapolation {
                    Extrapolation::Clamp => samples[0],
                    Extrapolation::Linear => {
                        lerp(first, samples[0], timestamps[1], samples[1], t)
                    }
                };
            }
            if t >= last {
                return match extrapolation {
                    Extrapolation::Clamp => samples[n - 1],
                    Extrapolation::Linear => {
                        lerp(timestamps[n - 2], samples[n - 2], last, samples[n - 1], t)
                    }
                };
            }
            let hi = timestamps.partition_point(|&v| v <= t);
            let lo = hi - 1;
            lerp(timestamps[lo], samples[lo], timestamps[hi], samples[hi], t)
        })
        .collect())
}

/// Sampling characteristics of one recorded channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingStats {
    /// Smallest positive gap between consecutive timestamps.
    pub min_interval: f64,
    pub mean_interval: f64,
    pub max_interval: f64,

    /// Smallest raster worth resampling to; slightly coarser than `min_interval`.
    pub suggested_min_raster: f64,
    pub sample_count: usize,

    /// Seconds between the first and last timestamp.
    pub duration: f64,
}

impl SamplingStats {
    /// Statistics of `timestamps`, or `None` with fewer than two samples or
    /// no positive interval.
    pub fn from_timestamps(timestamps: &[f64]) -> Option<Self> {
        if timestamps.len() < 2 {
            return None;
        }
        let diffs: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        let min_interval = diffs
            .iter()
            .copied()
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);
        if !min_interval.is_finite() {
            return None;
        }
        let max_interval = diffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_interval = diffs.iter().sum::<f64>() / diffs.len() as f64;

        Some(SamplingStats {
            min_interval,
            mean_interval,
            max_interval,
            suggested_min_raster: 1.1 * min_interval,
            sample_count: timestamps.len(),
            duration: timestamps[timestamps.len() - 1] - timestamps[0],
        })
    }
}

impl fmt::Display for SamplingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples over {}, interval {:.6} s (min) / {:.6} s (mean) / {:.6} s (max)",
            self.sample_count,
            format_hms(self.duration),
            self.min_interval,
            self.mean_interval,
            self.max_interval
        )
    }
}

/// Raster that every channel can support: the coarsest suggested minimum,
/// or [`DEFAULT_RASTER`] when `stats` is empty.
pub fn recommended_raster(stats: &[SamplingStats]) -> f64 {
    let suggested: Vec<f64> = stats.iter().map(|s| s.suggested_min_raster).collect();
    argmax(&suggested).map_or(DEFAULT_RASTER, |i| suggested[i])
}

/// Pairs two channels, truncating the longer one to the shorter length.
pub fn align_to_shortest(mut xs: Vec<f64>, mut ys: Vec<f64>) -> SampleSeries {
    let n = xs.len().min(ys.len());
    xs.truncate(n);
    ys.truncate(n);
    SampleSeries::from_pairs(xs.into_iter().zip(ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn time_base_excludes_end() {
        let times = common_time_base(1.0, 2.0, 0.25).unwrap();
        assert_eq!(times, vec![1.0, 1.25, 1.5, 1.75]);
        assert!(common_time_base(2.0, 1.0, 0.25).unwrap().is_empty());

        let err = common_time_base(0.0, 1.0, f64::NAN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn overlap_is_the_common_window() {
        let a = [0.0, 1.0, 2.0, 3.0];
        let b = [0.5, 2.5];
        let c = [0.2, 4.0];
        assert_eq!(overlap_window(&[&a, &b, &c]), Some((0.5, 2.5)));
        assert_eq!(overlap_window(&[&a, &[5.0, 6.0]]), None);
        assert_eq!(overlap_window(&[&a, &[]]), None);
        assert_eq!(overlap_window(&[]), None);
    }

    #[test]
    fn clamp_matches_held_ends() {
        let t = [1.0, 2.0, 4.0];
        let v = [10.0, 20.0, 0.0];
        let out = resample_linear(&t, &v, &[0.0, 1.0, 1.5, 3.0, 4.0, 9.0, f64::NAN], Extrapolation::Clamp)
            .unwrap();
        assert_eq!(&out[..6], &[10.0, 10.0, 15.0, 10.0, 0.0, 0.0]);
        assert!(out[6].is_nan());
    }

    #[test]
    fn linear_extrapolation_uses_outer_segments() {
        let t = [1.0, 2.0, 4.0];
        let v = [10.0, 20.0, 0.0];
        let out = resample_linear(&t, &v, &[0.0, 5.0], Extrapolation::Linear).unwrap();
        assert_eq!(out, vec![0.0, -10.0]);
    }

    #[test]
    fn resampling_rejects_bad_channels() {
        let err = resample_linear(&[0.0, 1.0], &[1.0], &[0.5], Extrapolation::Clamp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        let err = resample_linear(&[0.0, 2.0, 1.0], &[1.0, 2.0, 3.0], &[0.5], Extrapolation::Clamp)
            .unwrap_err();
        assert_eq!(
            err,
            CalmapError::AxisNotIncreasing { axis: "timestamps", index: 2 }
        );

        let out = resample_linear(&[], &[], &[0.5, 1.0], Extrapolation::Clamp).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sampling_stats_and_recommendation() {
        let stats = SamplingStats::from_timestamps(&[0.0, 0.01, 0.02, 0.02, 0.05]).unwrap();
        assert_eq!(stats.sample_count, 5);
        assert!((stats.min_interval - 0.01).abs() < 1e-12);
        assert!((stats.max_interval - 0.03).abs() < 1e-12);
        assert!((stats.mean_interval - 0.0125).abs() < 1e-12);
        assert!((stats.suggested_min_raster - 0.011).abs() < 1e-12);
        assert!(stats.to_string().starts_with("5 samples over 00:00:00.050"));

        let slow = SamplingStats::from_timestamps(&[0.0, 0.1, 0.2]).unwrap();
        assert!((recommended_raster(&[stats, slow]) - 0.11).abs() < 1e-12);
        assert_eq!(recommended_raster(&[]), DEFAULT_RASTER);

        assert!(SamplingStats::from_timestamps(&[1.0]).is_none());
        assert!(SamplingStats::from_timestamps(&[1.0, 1.0]).is_none());
    }

    #[test]
    fn alignment_truncates_the_longer_channel() {
        let series = align_to_shortest(vec![1.0, 2.0, 3.0], vec![4.0, 5.0]);
        assert_eq!(series.xs(), &[1.0, 2.0]);
        assert_eq!(series.ys(), &[4.0, 5.0]);
    }
}
