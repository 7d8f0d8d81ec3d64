/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for surface interpolation and concentration aggregation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for surface interpolation and concentration aggregation.
use serde::{Deserialize, Serialize};

#[doc = include_str!("../docs/params.md")]
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Params {
    /// Number of query samples handed to each worker during evaluation.
    pub eval_chunk_size: usize,

    /// Relative area below which a set of table points is treated as collinear.
    pub collinear_tolerance: f64,

    /// Slack applied to barycentric weights when deciding whether a query
    /// lies inside a triangle.
    pub barycentric_tolerance: f64,
}

impl Default for Params {
    fn default() -> Self {
        Params::builder().build()
    }
}

impl Params {
    /// Returns a new [`ParamsBuilder`] populated with the default values.
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::new()
    }
}

/// A convenience builder for constructing a [`Params`] instance.
///
/// The builder should be called via the [`Params::builder`] method.
///
/// See [`Params`] for details on each field.
#[derive(Debug, Clone)]
pub struct ParamsBuilder {
    pub eval_chunk_size: usize,
    pub collinear_tolerance: f64,
    pub barycentric_tolerance: f64,
}

impl ParamsBuilder {
    fn new() -> Self {
        Self {
            eval_chunk_size: 4096,
            collinear_tolerance: 1e-10,
            barycentric_tolerance: 1e-10,
        }
    }

    /// Sets the evaluation chunk size. Values below one are raised to one.
    pub fn eval_chunk_size(mut self, eval_chunk_size: usize) -> Self {
        self.eval_chunk_size = eval_chunk_size.max(1);
        self
    }

    /// Sets the collinearity tolerance.
    pub fn collinear_tolerance(mut self, collinear_tolerance: f64) -> Self {
        self.collinear_tolerance = collinear_tolerance;
        self
    }

    /// Sets the barycentric containment tolerance.
    pub fn barycentric_tolerance(mut self, barycentric_tolerance: f64) -> Self {
        self.barycentric_tolerance = barycentric_tolerance;
        self
    }

    /// Builds and returns a [`Params`] instance.
    pub fn build(self) -> Params {
        Params {
            eval_chunk_size: self.eval_chunk_size,
            collinear_tolerance: self.collinear_tolerance,
            barycentric_tolerance: self.barycentric_tolerance,
        }
    }
}

/// What to do with samples that fall outside the extent of an edge grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Clamp the sample into the nearest boundary cell.
    #[default]
    Clamp,

    /// Drop the sample from the histogram and count it as outside.
    Exclude,
}

/// Parameters controlling a [`ConcentrationAggregator`](crate::ConcentrationAggregator).
///
/// ### Default Values
/// - `out_of_range`: [`OutOfRangePolicy::Clamp`]
/// - `chunk_size`: `65536`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AggregatorParams {
    /// Handling of samples outside the grid extent.
    pub out_of_range: OutOfRangePolicy,

    /// Number of samples binned by each worker before counts are merged.
    pub chunk_size: usize,
}

impl Default for AggregatorParams {
    fn default() -> Self {
        AggregatorParams {
            out_of_range: OutOfRangePolicy::Clamp,
            chunk_size: 65536,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let params = Params::builder()
            .eval_chunk_size(0)
            .barycentric_tolerance(1e-8)
            .build();
        assert_eq!(params.eval_chunk_size, 1);
        assert_eq!(params.barycentric_tolerance, 1e-8);
        assert_eq!(params.collinear_tolerance, Params::default().collinear_tolerance);
    }

    #[test]
    fn policy_serializes_in_snake_case() {
        let json = serde_json::to_string(&AggregatorParams {
            out_of_range: OutOfRangePolicy::Exclude,
            chunk_size: 8,
        })
        .unwrap();
        assert_eq!(json, r#"{"out_of_range":"exclude","chunk_size":8}"#);
    }
}
