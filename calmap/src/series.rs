/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the paired sample sequences extracted from a vehicle log.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{CalmapError, Result};

/// Two equal-length, index-aligned channels, typically RPM (`xs`) and ETASP (`ys`).
///
/// NaN entries are allowed; operations that consume a series skip them
/// without shifting the position of any other sample.
///
/// # Examples
/// ```
/// use calmap::SampleSeries;
///
/// let series = SampleSeries::new(vec![1100.0, f64::NAN], vec![0.12, 0.2])?;
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.valid_count(), 1);
/// # Ok::<(), calmap::CalmapError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleSeries {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SampleSeries {
    /// Pairs two channels, failing if their lengths differ.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(CalmapError::LengthMismatch {
                what: "sample series",
                left: xs.len(),
                right: ys.len(),
            });
        }
        Ok(Self { xs, ys })
    }

    /// Builds a series from `(x, y)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (xs, ys) = pairs.into_iter().unzip();
        Self { xs, ys }
    }

    /// First channel.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Second channel.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Number of samples, including NaN ones.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Iterates over `(x, y)` pairs in sample order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Number of samples where neither coordinate is NaN.
    pub fn valid_count(&self) -> usize {
        self.iter().filter(|(x, y)| !x.is_nan() && !y.is_nan()).count()
    }

    /// Returns the samples whose mask entry is `true`, preserving order.
    pub fn select(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(CalmapError::LengthMismatch {
                what: "sample mask",
                left: mask.len(),
                right: self.len(),
            });
        }
        Ok(Self::from_pairs(
            self.iter()
                .zip(mask.iter())
                .filter(|(_, keep)| **keep)
                .map(|(p, _)| p),
        ))
    }

    /// Appends the samples of `other` to the end of this series.
    pub fn extend_from(&mut self, other: &SampleSeries) {
        self.xs.extend_from_slice(&other.xs);
        self.ys.extend_from_slice(&other.ys);
    }
}
