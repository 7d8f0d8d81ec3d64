/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines value-range filters that select log samples by an auxiliary channel.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{CalmapError, Result};
use serde::{Deserialize, Serialize};

/// Which side of a [`RangeFilter`]'s bounds is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangeCondition {
    /// Keep `min <= v <= max`.
    #[default]
    Within,

    /// Keep `v < min` or `v > max`.
    Outside,
}

/// Keeps samples whose filter-channel value lies within, or outside, `[min, max]`.
///
/// NaN channel values never pass.
///
/// # Example
/// ```
/// use calmap::{RangeCondition, RangeFilter};
///
/// let warm = RangeFilter::new(70.0, 110.0, RangeCondition::Within)?;
/// assert_eq!(warm.mask(&[20.0, 85.0, f64::NAN]), vec![false, true, false]);
/// # Ok::<(), calmap::CalmapError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
    pub condition: RangeCondition,
}

impl RangeFilter {
    /// Fails when either bound is NaN or `min > max`.
    pub fn new(min: f64, max: f64, condition: RangeCondition) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(CalmapError::InvalidConfiguration {
                field: "min",
                value: min,
                min: f64::NEG_INFINITY,
                max,
            });
        }
        Ok(RangeFilter { min, max, condition })
    }

    #[inline]
    pub fn accepts(&self, v: f64) -> bool {
        match self.condition {
            RangeCondition::Within => v >= self.min && v <= self.max,
            RangeCondition::Outside => v < self.min || v > self.max,
        }
    }

    /// One entry per value of the filter channel.
    pub fn mask(&self, values: &[f64]) -> Vec<bool> {
        values.iter().map(|&v| self.accepts(v)).collect()
    }
}

/// Logical AND of several masks of length `len`. No masks keeps everything.
pub fn combine_masks(len: usize, masks: &[Vec<bool>]) -> Result<Vec<bool>> {
    let mut combined = vec![true; len];
    for mask in masks {
        if mask.len() != len {
            return Err(CalmapError::LengthMismatch {
                what: "filter mask",
                left: mask.len(),
                right: len,
            });
        }
        for (keep, &m) in combined.iter_mut().zip(mask) {
            *keep &= m;
        }
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::series::SampleSeries;

    #[test]
    fn outside_keeps_both_tails() {
        let filter = RangeFilter::new(1.0, 2.0, RangeCondition::Outside).unwrap();
        assert_eq!(
            filter.mask(&[0.5, 1.0, 1.5, 2.0, 2.5, f64::NAN]),
            vec![true, false, false, false, true, false]
        );
    }

    #[test]
    fn masks_combine_with_and() {
        let speed = RangeFilter::new(10.0, 50.0, RangeCondition::Within).unwrap();
        let gear = RangeFilter::new(3.0, 3.0, RangeCondition::Outside).unwrap();
        let masks = [speed.mask(&[5.0, 20.0, 30.0]), gear.mask(&[2.0, 3.0, 4.0])];
        let keep = combine_masks(3, &masks).unwrap();
        assert_eq!(keep, vec![false, false, true]);

        let series = SampleSeries::from_pairs([(1000.0, 0.1), (1500.0, 0.2), (2000.0, 0.3)]);
        assert_eq!(series.select(&keep).unwrap().xs(), &[2000.0]);
        assert_eq!(combine_masks(2, &[]).unwrap(), vec![true, true]);
    }

    #[test]
    fn bad_bounds_and_lengths_are_rejected() {
        let err = RangeFilter::new(2.0, 1.0, RangeCondition::Within).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(RangeFilter::new(f64::NAN, 1.0, RangeCondition::Within).is_err());

        let err = combine_masks(3, &[vec![true, false]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }
}
