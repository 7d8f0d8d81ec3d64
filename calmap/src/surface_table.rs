/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the cleaned, immutable set of authored calibration points.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{CalmapError, Result};
use calmap_utils::{finite_extents, unique_sorted};
use faer::Mat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum number of points needed to form a triangle.
pub(crate) const MIN_TABLE_POINTS: usize = 3;

/// One authored calibration point: `x` (RPM), `y` (ETASP) and the mapped value `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SurfacePoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[doc = include_str!("../docs/surface_table.md")]
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTable {
    points: Vec<SurfacePoint>,
    rows_discarded: usize,
    duplicates_removed: usize,
}

/// Hash key treating `-0.0` and `0.0` as the same coordinate.
#[inline]
fn coord_key(p: &SurfacePoint) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

impl SurfaceTable {
    /// Cleans `points` and wraps them in a table.
    ///
    /// Rows containing a non-finite value are discarded. Where the same
    /// `(x, y)` occurs more than once, only the last occurrence is kept.
    /// Fails with [`CalmapError::InsufficientData`] when fewer than three
    /// points survive.
    pub fn new(points: Vec<SurfacePoint>) -> Result<Self> {
        let total = points.len();
        let finite: Vec<SurfacePoint> = points
            .into_iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
            .collect();
        let rows_discarded = total - finite.len();

        let mut last_seen: HashMap<(u64, u64), usize> = HashMap::with_capacity(finite.len());
        for (i, p) in finite.iter().enumerate() {
            last_seen.insert(coord_key(p), i);
        }

        let cleaned: Vec<SurfacePoint> = finite
            .iter()
            .enumerate()
            .filter(|(i, p)| last_seen.get(&coord_key(p)) == Some(i))
            .map(|(_, p)| *p)
            .collect();
        let duplicates_removed = finite.len() - cleaned.len();

        if cleaned.len() < MIN_TABLE_POINTS {
            return Err(CalmapError::InsufficientData {
                found: cleaned.len(),
                required: MIN_TABLE_POINTS,
            });
        }

        Ok(Self {
            points: cleaned,
            rows_discarded,
            duplicates_removed,
        })
    }

    /// Builds a table from three equal-length columns.
    pub fn from_columns(xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(CalmapError::LengthMismatch {
                what: "table x/y columns",
                left: xs.len(),
                right: ys.len(),
            });
        }
        if xs.len() != zs.len() {
            return Err(CalmapError::LengthMismatch {
                what: "table x/z columns",
                left: xs.len(),
                right: zs.len(),
            });
        }
        Self::new(
            xs.iter()
                .zip(ys)
                .zip(zs)
                .map(|((x, y), z)| SurfacePoint::new(*x, *y, *z))
                .collect(),
        )
    }

    /// Builds a table from an `(n × 2)` coordinate matrix and an `(n × 1)` value matrix.
    pub fn from_point_arrays(points: &Mat<f64>, values: &Mat<f64>) -> Result<Self> {
        if points.ncols() != 2 {
            return Err(CalmapError::LengthMismatch {
                what: "coordinate columns",
                left: points.ncols(),
                right: 2,
            });
        }
        if points.nrows() != values.nrows() || values.ncols() != 1 {
            return Err(CalmapError::LengthMismatch {
                what: "points/values rows",
                left: points.nrows(),
                right: values.nrows(),
            });
        }
        Self::new(
            (0..points.nrows())
                .map(|i| SurfacePoint::new(points[(i, 0)], points[(i, 1)], values[(i, 0)]))
                .collect(),
        )
    }

    /// The cleaned points, in input order.
    pub fn points(&self) -> &[SurfacePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of input rows dropped for containing NaN or infinity.
    pub fn rows_discarded(&self) -> usize {
        self.rows_discarded
    }

    /// Number of input rows dropped because a later row had the same `(x, y)`.
    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    /// Distinct x values in ascending order.
    pub fn x_axis(&self) -> Vec<f64> {
        unique_sorted(&self.points.iter().map(|p| p.x).collect::<Vec<_>>())
    }

    /// Distinct y values in ascending order.
    pub fn y_axis(&self) -> Vec<f64> {
        unique_sorted(&self.points.iter().map(|p| p.y).collect::<Vec<_>>())
    }

    /// Bounding box as `[xmin, ymin, xmax, ymax]`.
    pub fn extents(&self) -> [f64; 4] {
        let xs: Vec<f64> = self.points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = self.points.iter().map(|p| p.y).collect();
        // A built table always holds at least three finite points.
        let (xmin, xmax) = finite_extents(&xs).unwrap_or((0.0, 0.0));
        let (ymin, ymax) = finite_extents(&ys).unwrap_or((0.0, 0.0));
        [xmin, ymin, xmax, ymax]
    }

    /// Coordinates as an `(n × 2)` matrix.
    pub fn coordinates(&self) -> Mat<f64> {
        Mat::from_fn(self.points.len(), 2, |i, j| match j {
            0 => self.points[i].x,
            _ => self.points[i].y,
        })
    }

    /// Values as an `(n × 1)` matrix.
    pub fn values(&self) -> Mat<f64> {
        Mat::from_fn(self.points.len(), 1, |i, _| self.points[i].z)
    }
}
