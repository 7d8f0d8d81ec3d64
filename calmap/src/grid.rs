/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines rectilinear grids of cells used to bin log samples.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{CalmapError, Result};
use crate::surface_table::SurfaceTable;
use calmap_utils::{
    centers_to_edges, digitize_clamped, first_non_increasing, linspace, midpoints, nearest_index,
};
use serde::{Deserialize, Deserializer, Serialize};

/// How the axis values of a [`Grid`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// Values are cell boundaries; `n` values make `n - 1` cells.
    #[default]
    Edges,

    /// Values are cell centres; `n` values make `n` cells and samples go
    /// to the nearest centre.
    Centers,
}

#[doc = include_str!("../docs/grid.md")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    kind: GridKind,
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Unchecked serialized form of a [`Grid`].
#[derive(Deserialize)]
struct GridRecord {
    #[serde(default)]
    kind: GridKind,
    #[serde(default)]
    x: Vec<f64>,
    #[serde(default)]
    y: Vec<f64>,
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = GridRecord::deserialize(deserializer)?;
        let grid = match record.kind {
            GridKind::Edges => Grid::from_edges(record.x, record.y),
            GridKind::Centers => Grid::from_centers(record.x, record.y),
        };
        grid.map_err(serde::de::Error::custom)
    }
}

fn check_axis(axis: &'static str, values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Err(CalmapError::AxisTooShort {
            axis,
            len: values.len(),
        });
    }
    if let Some(index) = first_non_increasing(values) {
        return Err(CalmapError::AxisNotIncreasing { axis, index });
    }
    if values.iter().any(|v| v.is_infinite()) {
        return Err(CalmapError::AxisNotIncreasing { axis, index: 0 });
    }
    Ok(())
}

impl Grid {
    /// Grid whose axes hold cell boundaries.
    pub fn from_edges(x_edges: Vec<f64>, y_edges: Vec<f64>) -> Result<Self> {
        check_axis("x_edges", &x_edges)?;
        check_axis("y_edges", &y_edges)?;
        Ok(Self {
            kind: GridKind::Edges,
            x: x_edges,
            y: y_edges,
        })
    }

    /// Grid whose axes hold cell centres.
    pub fn from_centers(x_centers: Vec<f64>, y_centers: Vec<f64>) -> Result<Self> {
        check_axis("x_centers", &x_centers)?;
        check_axis("y_centers", &y_centers)?;
        Ok(Self {
            kind: GridKind::Centers,
            x: x_centers,
            y: y_centers,
        })
    }

    /// One cell per distinct table coordinate, centred on it.
    pub fn from_table(table: &SurfaceTable) -> Result<Self> {
        Self::from_centers(table.x_axis(), table.y_axis())
    }

    /// Evenly divides `[x_min, x_max] × [y_min, y_max]` into
    /// `x_intervals × y_intervals` cells.
    pub fn uniform(
        (x_min, x_max): (f64, f64),
        (y_min, y_max): (f64, f64),
        x_intervals: usize,
        y_intervals: usize,
    ) -> Result<Self> {
        Self::from_edges(
            linspace(x_min, x_max, x_intervals + 1),
            linspace(y_min, y_max, y_intervals + 1),
        )
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Axis values along x, interpreted according to [`Grid::kind`].
    pub fn x_values(&self) -> &[f64] {
        &self.x
    }

    /// Axis values along y, interpreted according to [`Grid::kind`].
    pub fn y_values(&self) -> &[f64] {
        &self.y
    }

    pub fn rows(&self) -> usize {
        match self.kind {
            GridKind::Edges => self.y.len() - 1,
            GridKind::Centers => self.y.len(),
        }
    }

    pub fn cols(&self) -> usize {
        match self.kind {
            GridKind::Edges => self.x.len() - 1,
            GridKind::Centers => self.x.len(),
        }
    }

    /// `(rows, cols)`; rows follow y and columns follow x.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn num_cells(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Whether `(x, y)` lies within the first and last axis values, inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (x0, x1) = (self.x[0], self.x[self.x.len() - 1]);
        let (y0, y1) = (self.y[0], self.y[self.y.len() - 1]);
        x >= x0 && x <= x1 && y >= y0 && y <= y1
    }

    /// Cell `(row, col)` for a sample, clamping samples beyond the grid
    /// into the boundary cells. `None` when either coordinate is NaN.
    #[inline]
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if x.is_nan() || y.is_nan() {
            return None;
        }
        Some(match self.kind {
            GridKind::Edges => (digitize_clamped(&self.y, y), digitize_clamped(&self.x, x)),
            GridKind::Centers => (nearest_index(&self.y, y), nearest_index(&self.x, x)),
        })
    }

    /// Cell boundaries along x. For a centre grid these sit halfway between centres.
    pub fn x_edges(&self) -> Vec<f64> {
        match self.kind {
            GridKind::Edges => self.x.clone(),
            GridKind::Centers => centers_to_edges(&self.x),
        }
    }

    /// Cell boundaries along y. For a centre grid these sit halfway between centres.
    pub fn y_edges(&self) -> Vec<f64> {
        match self.kind {
            GridKind::Edges => self.y.clone(),
            GridKind::Centers => centers_to_edges(&self.y),
        }
    }

    /// Cell centres along x.
    pub fn x_centers(&self) -> Vec<f64> {
        match self.kind {
            GridKind::Edges => midpoints(&self.x),
            GridKind::Centers => self.x.clone(),
        }
    }

    /// Cell centres along y.
    pub fn y_centers(&self) -> Vec<f64> {
        match self.kind {
            GridKind::Edges => midpoints(&self.y),
            GridKind::Centers => self.y.clone(),
        }
    }

    /// Bounds of cell `(row, col)` as `[xmin, ymin, xmax, ymax]`.
    pub fn cell_bounds(&self, row: usize, col: usize) -> Option<[f64; 4]> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let xe = self.x_edges();
        let ye = self.y_edges();
        Some([xe[col], ye[row], xe[col + 1], ye[row + 1]])
    }
}
