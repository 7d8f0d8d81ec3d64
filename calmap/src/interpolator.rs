/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements two-pass scattered interpolation of a surface table: linear, then nearest.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    common::{create_evaluation_grid, reshape_row_major, Scaling},
    config::Params,
    delaunay::{orient, triangulate, TriangulationFailure},
    error::{CalmapError, Result},
    kdtree::KDTree,
    progress::{report, ProgressMsg, ProgressSink},
    rtree::TriangleIndex,
    series::SampleSeries,
    surface_table::{SurfaceTable, MIN_TABLE_POINTS},
};
use faer::Mat;
use rayon::prelude::*;
use std::sync::Arc;

/// Which pass produced an evaluated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Barycentric interpolation inside the table's convex hull.
    Linear,

    /// Value of the closest table point; the query was outside the hull.
    Nearest,

    /// The query had a NaN coordinate.
    Missing,
}

/// Values together with the pass that produced each one.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub values: Vec<f64>,
    pub sources: Vec<ValueSource>,
}

impl Evaluation {
    /// Number of values produced by `source`.
    pub fn count(&self, source: ValueSource) -> usize {
        self.sources.iter().filter(|s| **s == source).count()
    }

    /// Mask of samples resolved by the nearest-neighbour fallback.
    pub fn extrapolated(&self) -> Vec<bool> {
        self.sources
            .iter()
            .map(|s| *s == ValueSource::Nearest)
            .collect()
    }
}

/// Builder for [`SurfaceInterpolator`].
///
/// The builder should be called via the [`SurfaceInterpolator::builder`] method.
pub struct SurfaceInterpolatorBuilder {
    table: SurfaceTable,
    params: Params,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl SurfaceInterpolatorBuilder {
    fn new(table: SurfaceTable) -> Self {
        Self {
            table,
            params: Params::default(),
            progress_callback: None,
        }
    }

    /// Sets custom evaluation and tolerance parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Optional callback for reporting build and evaluation progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Triangulates the table and returns the configured [`SurfaceInterpolator`].
    pub fn build(self) -> Result<SurfaceInterpolator> {
        SurfaceInterpolator::new(self.table, self.params, self.progress_callback)
    }
}

#[doc = include_str!("../docs/surface_interpolator.md")]
pub struct SurfaceInterpolator {
    table: SurfaceTable,
    params: Params,
    scaling: Scaling,
    scaled: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    index: TriangleIndex,
    kdtree: KDTree,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for SurfaceInterpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceInterpolator")
            .field("num_points", &self.table.len())
            .field("num_triangles", &self.triangles.len())
            .field("params", &self.params)
            .finish()
    }
}

impl SurfaceInterpolator {
    /// Returns a [`SurfaceInterpolatorBuilder`] for `table`.
    pub fn builder(table: SurfaceTable) -> SurfaceInterpolatorBuilder {
        SurfaceInterpolatorBuilder::new(table)
    }

    /// Builds an interpolator with default [`Params`].
    pub fn build(table: SurfaceTable) -> Result<Self> {
        Self::builder(table).build()
    }

    fn new(
        table: SurfaceTable,
        params: Params,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self> {
        if table.rows_discarded() > 0 {
            report(
                &progress_callback,
                ProgressMsg::RowsDiscarded {
                    num_rows: table.rows_discarded(),
                },
            );
        }
        if table.duplicates_removed() > 0 {
            report(
                &progress_callback,
                ProgressMsg::DuplicatesRemoved {
                    num_duplicates: table.duplicates_removed(),
                },
            );
        }

        let scaling = Scaling::from_extents(table.extents());
        let scaled: Vec<[f64; 2]> = table
            .points()
            .iter()
            .map(|p| scaling.apply(p.x, p.y))
            .collect();

        let triangulation =
            triangulate(&scaled, params.collinear_tolerance).map_err(|e| match e {
                TriangulationFailure::TooFewPoints => CalmapError::InsufficientData {
                    found: scaled.len(),
                    required: MIN_TABLE_POINTS,
                },
                TriangulationFailure::Collinear => CalmapError::DegenerateInput {
                    reason: format!(
                        "all {} table points are collinear; no triangle can be formed",
                        scaled.len()
                    ),
                },
            })?;

        if !triangulation.skipped.is_empty() {
            report(
                &progress_callback,
                ProgressMsg::Message {
                    message: format!(
                        "{} table points left out of the triangulation",
                        triangulation.skipped.len()
                    ),
                },
            );
        }
        report(
            &progress_callback,
            ProgressMsg::TriangulationBuilt {
                num_points: scaled.len(),
                num_triangles: triangulation.triangles.len(),
            },
        );

        let index = TriangleIndex::from_triangles(&scaled, &triangulation.triangles);
        let raw: Vec<[f64; 2]> = table.points().iter().map(|p| [p.x, p.y]).collect();
        let kdtree = KDTree::new(&raw);

        Ok(SurfaceInterpolator {
            table,
            params,
            scaling,
            scaled,
            triangles: triangulation.triangles,
            index,
            kdtree,
            progress_callback,
        })
    }

    /// The cleaned table this interpolator was built from.
    pub fn table(&self) -> &SurfaceTable {
        &self.table
    }

    /// Triangles as counter-clockwise index triples into [`SurfaceTable::points`].
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Linear barycentric value at `(x, y)`, or NaN outside the convex hull.
    pub fn linear_at(&self, x: f64, y: f64) -> f64 {
        if x.is_nan() || y.is_nan() {
            return f64::NAN;
        }
        let q = self.scaling.apply(x, y);
        let tol = self.params.barycentric_tolerance;
        let points = self.table.points();

        for t in self.index.candidates(q, tol) {
            let [ia, ib, ic] = self.triangles[t];
            let (a, b, c) = (self.scaled[ia], self.scaled[ib], self.scaled[ic]);
            let det = orient(a, b, c);
            if !(det > 0.0) {
                continue;
            }
            let wa = orient(b, c, q) / det;
            let wb = orient(c, a, q) / det;
            let wc = orient(a, b, q) / det;
            if wa >= -tol && wb >= -tol && wc >= -tol {
                return wa * points[ia].z + wb * points[ib].z + wc * points[ic].z;
            }
        }
        f64::NAN
    }

    /// Value of the table point closest to `(x, y)` in raw units.
    ///
    /// Equidistant points resolve to the one that appears first in the table.
    pub fn nearest_at(&self, x: f64, y: f64) -> f64 {
        match self.kdtree.nearest([x, y]) {
            Some((id, _)) => self.table.points()[id].z,
            None => f64::NAN,
        }
    }

    /// Evaluates a single query and reports which pass resolved it.
    pub fn evaluate_point(&self, x: f64, y: f64) -> (f64, ValueSource) {
        if x.is_nan() || y.is_nan() {
            return (f64::NAN, ValueSource::Missing);
        }

        // Queries on a table node return its value exactly.
        if let Some((id, dist)) = self.kdtree.nearest([x, y]) {
            if dist == 0.0 {
                return (self.table.points()[id].z, ValueSource::Linear);
            }
        }

        let linear = self.linear_at(x, y);
        if !linear.is_nan() {
            return (linear, ValueSource::Linear);
        }

        let nearest = self.nearest_at(x, y);
        if nearest.is_nan() {
            (f64::NAN, ValueSource::Missing)
        } else {
            (nearest, ValueSource::Nearest)
        }
    }

    /// Evaluates every sample and records the pass used for each.
    ///
    /// Work is split across threads in chunks of `eval_chunk_size`; the
    /// output order always matches the input order.
    pub fn evaluate_detailed(&self, samples: &SampleSeries) -> Evaluation {
        let xs = samples.xs();
        let ys = samples.ys();

        let (values, sources): (Vec<f64>, Vec<ValueSource>) = (0..samples.len())
            .into_par_iter()
            .with_min_len(self.params.eval_chunk_size)
            .map(|i| self.evaluate_point(xs[i], ys[i]))
            .unzip();

        let evaluation = Evaluation { values, sources };
        report(
            &self.progress_callback,
            ProgressMsg::EvaluationSummary {
                linear: evaluation.count(ValueSource::Linear),
                nearest: evaluation.count(ValueSource::Nearest),
                missing: evaluation.count(ValueSource::Missing),
            },
        );
        evaluation
    }

    /// Evaluates the table at every sample, returning one value per sample.
    ///
    /// NaN coordinates give NaN; queries outside the table's convex hull take
    /// the value of the nearest table point.
    pub fn evaluate(&self, samples: &SampleSeries) -> Vec<f64> {
        self.evaluate_detailed(samples).values
    }

    /// Evaluates raw channel slices, failing if their lengths differ.
    pub fn evaluate_slices(&self, xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
        let samples = SampleSeries::new(xs.to_vec(), ys.to_vec())?;
        Ok(self.evaluate(&samples))
    }

    /// Evaluates the model on a rectilinear grid.
    ///
    /// Returns a `(y_axis.len() × x_axis.len())` matrix.
    pub fn resample(&self, x_axis: &[f64], y_axis: &[f64]) -> Mat<f64> {
        let grid = create_evaluation_grid(x_axis, y_axis);
        let values = self.evaluate(&grid);
        reshape_row_major(&values, y_axis.len(), x_axis.len())
    }

    /// Evaluates the model on the table's own distinct axes.
    ///
    /// Returns `(x_axis, y_axis, values)`.
    pub fn resample_on_table_axes(&self) -> (Vec<f64>, Vec<f64>, Mat<f64>) {
        let x_axis = self.table.x_axis();
        let y_axis = self.table.y_axis();
        let values = self.resample(&x_axis, &y_axis);
        (x_axis, y_axis, values)
    }
}
