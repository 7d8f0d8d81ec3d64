/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for slices, matrices, extents, and time formatting.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;

/// Returns the index of the largest non-NaN value, first occurrence on ties.
///
/// # Examples
///
/// ```
/// use calmap_utils::argmax;
///
/// assert_eq!(argmax(&[3.0, f64::NAN, 7.0, 7.0]), Some(2));
/// assert_eq!(argmax(&[]), None);
/// ```
#[inline(always)]
pub fn argmax(data: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, value) in data.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some(b) if data[b] >= *value => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Returns `(min, max)` over the finite entries of `values`.
///
/// # Examples
///
/// ```
/// use calmap_utils::finite_extents;
///
/// assert_eq!(finite_extents(&[2.0, f64::NAN, -1.0, f64::INFINITY]), Some((-1.0, 2.0)));
/// assert_eq!(finite_extents(&[f64::NAN]), None);
/// ```
pub fn finite_extents(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Sums the non-NaN entries of a matrix.
pub fn nan_sum(values: &Mat<f64>) -> f64 {
    let mut total = 0.0;
    for j in 0..values.ncols() {
        for i in 0..values.nrows() {
            let v = values[(i, j)];
            if !v.is_nan() {
                total += v;
            }
        }
    }
    total
}

/// Formats a duration in seconds as `HH:MM:SS.mmm`.
///
/// Negative and non-finite durations format as zero.
///
/// # Examples
///
/// ```
/// use calmap_utils::format_hms;
///
/// assert_eq!(format_hms(3725.5), "01:02:05.500");
/// assert_eq!(format_hms(-3.0), "00:00:00.000");
/// ```
pub fn format_hms(seconds: f64) -> String {
    if !(seconds >= 0.0) || !seconds.is_finite() {
        return "00:00:00.000".to_string();
    }
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = seconds % 60.0;
    format!("{hours:02}:{minutes:02}:{secs:06.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_skips_nan_and_keeps_first() {
        let data = [f64::NAN, 2.0, 5.0, 5.0, -1.0, -1.0];
        assert_eq!(argmax(&data), Some(2));
        assert_eq!(argmax(&[f64::NAN, f64::NAN]), None);
    }

    #[test]
    fn nan_sum_ignores_missing_cells() {
        let m = Mat::from_fn(2, 2, |i, j| if i == j { f64::NAN } else { 1.5 });
        assert_eq!(nan_sum(&m), 3.0);
    }

    #[test]
    fn format_hms_rolls_over_hours() {
        assert_eq!(format_hms(59.9994), "00:00:59.999");
        assert_eq!(format_hms(36_000.0), "10:00:00.000");
        assert_eq!(format_hms(f64::NAN), "00:00:00.000");
    }
}
