/////////////////////////////////////////////////////////////////////////////////////////////
//
// Axis construction and binning helpers for rectilinear calibration grids.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Returns the index of the first value that breaks strict increase, if any.
///
/// A NaN entry always breaks the ordering.
///
/// # Examples
///
/// ```
/// use calmap_utils::first_non_increasing;
///
/// assert_eq!(first_non_increasing(&[1.0, 2.0, 3.0]), None);
/// assert_eq!(first_non_increasing(&[1.0, 2.0, 2.0]), Some(2));
/// assert_eq!(first_non_increasing(&[f64::NAN, 2.0]), Some(0));
/// ```
pub fn first_non_increasing(values: &[f64]) -> Option<usize> {
    if let Some(first) = values.first() {
        if first.is_nan() {
            return Some(0);
        }
    }

    values
        .windows(2)
        .position(|w| !(w[1] > w[0]))
        .map(|i| i + 1)
}

/// Returns the distinct finite values of `values` in ascending order.
///
/// # Examples
///
/// ```
/// use calmap_utils::unique_sorted;
///
/// let axis = unique_sorted(&[1500.0, 1000.0, f64::NAN, 1500.0, 1200.0]);
/// assert_eq!(axis, vec![1000.0, 1200.0, 1500.0]);
/// ```
pub fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(|a, b| a.total_cmp(b));
    // -0.0 and 0.0 are the same axis position
    out.dedup_by(|a, b| a == b);
    out
}

/// Returns `n` evenly spaced values over the closed interval `[start, end]`.
///
/// The final value is exactly `end`.
///
/// # Examples
///
/// ```
/// use calmap_utils::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
/// ```
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Returns values from `start` (inclusive) to `end` (exclusive) separated by `step`.
///
/// Returns an empty vector when `step` is not positive or the interval is empty.
///
/// # Examples
///
/// ```
/// use calmap_utils::arange;
///
/// assert_eq!(arange(0.0, 1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75]);
/// assert!(arange(1.0, 0.0, 0.25).is_empty());
/// ```
pub fn arange(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(end > start) {
        return Vec::new();
    }
    let n = ((end - start) / step).ceil() as usize;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Locates `x` among histogram `edges`, clamping to the first and last bin.
///
/// Bin `i` covers `[edges[i], edges[i + 1])`, except that a value at or
/// beyond the last edge falls into the last bin and a value below the first
/// edge falls into the first bin. `edges` must be ascending with at least two
/// entries.
///
/// # Examples
///
/// ```
/// use calmap_utils::digitize_clamped;
///
/// let edges = [0.0, 1.0, 2.0];
/// assert_eq!(digitize_clamped(&edges, -5.0), 0);
/// assert_eq!(digitize_clamped(&edges, 1.0), 1);
/// assert_eq!(digitize_clamped(&edges, 2.0), 1);
/// ```
#[inline]
pub fn digitize_clamped(edges: &[f64], x: f64) -> usize {
    debug_assert!(edges.len() >= 2);
    let above = edges.partition_point(|e| *e <= x);
    above.saturating_sub(1).min(edges.len() - 2)
}

/// Returns the index of the entry of ascending `values` nearest to `x`.
///
/// When `x` is equidistant from two entries the lower index wins.
///
/// # Examples
///
/// ```
/// use calmap_utils::nearest_index;
///
/// let centers = [10.0, 20.0, 30.0];
/// assert_eq!(nearest_index(&centers, 14.0), 0);
/// assert_eq!(nearest_index(&centers, 15.0), 0);
/// assert_eq!(nearest_index(&centers, 99.0), 2);
/// ```
#[inline]
pub fn nearest_index(values: &[f64], x: f64) -> usize {
    debug_assert!(!values.is_empty());
    let i = values.partition_point(|v| *v < x);
    if i == 0 {
        0
    } else if i == values.len() {
        values.len() - 1
    } else if x - values[i - 1] <= values[i] - x {
        i - 1
    } else {
        i
    }
}

/// Returns the midpoints between consecutive values.
pub fn midpoints(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Converts cell centers to cell edges.
///
/// Interior edges sit halfway between neighbouring centers; the outer edges
/// mirror the first and last half-spacing.
///
/// # Examples
///
/// ```
/// use calmap_utils::centers_to_edges;
///
/// assert_eq!(centers_to_edges(&[1.0, 2.0, 4.0]), vec![0.5, 1.5, 3.0, 5.0]);
/// ```
pub fn centers_to_edges(centers: &[f64]) -> Vec<f64> {
    let n = centers.len();
    if n < 2 {
        return centers.to_vec();
    }
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
    edges.extend(midpoints(centers));
    edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
    edges
}
