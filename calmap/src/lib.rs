/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for calibration map evaluation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Surface-table interpolation and operating-point concentration.
//!
//! Engine calibration maps are sparse, hand-authored lookup tables over two
//! operating axes, typically engine speed (RPM) and a normalised load
//! (ETASP). A vehicle log supplies long, synchronised recordings of both axes.
//! This crate provides the numeric core that connects the two:
//!
//! - **[`SurfaceInterpolator`]** - built once from a [`SurfaceTable`], then
//!   evaluated for every log sample. Values come from linear interpolation
//!   over a Delaunay triangulation of the table; samples outside the table's
//!   convex hull fall back to the nearest table point, and only those.
//! - **[`ConcentrationAggregator`]** - bins every log sample into the cells
//!   of a [`Grid`] to show where the engine spends its time, with percentages,
//!   summary [`Metrics`] and an estimated-hours figure.
//! - **[`recompute`]** - turns a [`Concentration`] into a shaded or scattered
//!   overlay under an explicit [`OverlaySettings`] value.
//!
//! The crate does no file I/O. Parsing logs and tables, and writing results
//! back, is left to the caller; everything here takes and returns plain
//! numeric arrays. Helpers for synchronising channels ([`common_time_base`],
//! [`resample_linear`]) and selecting samples ([`RangeFilter`]) cover the
//! steps usually needed in between.
//!
//! Check out the examples directory in the repository for more examples of usage.
//!
//! # Features
//! - Two-pass evaluation that is exact at table nodes and never lets the
//!   nearest-neighbour fallback override a linear result
//! - Per-sample record of which pass produced a value, for flagging extrapolation
//! - Parallel, order-preserving evaluation and binning via [`rayon`](https://docs.rs/rayon)
//! - Edge and centre grids with clamped or excluded out-of-range samples
//! - Reproducible, seeded scatter overlays
//!
//! # Examples
//!
//! ```
//! use calmap::{
//!     ConcentrationAggregator, Grid, SampleSeries, SurfaceInterpolator, SurfaceTable,
//! };
//!
//! // A three-point table over RPM and ETASP
//! let table = SurfaceTable::from_columns(
//!     &[1000.0, 1200.0, 1500.0],
//!     &[0.1, 0.15, 0.2],
//!     &[15.5, 18.2, 22.1],
//! )?;
//! let model = SurfaceInterpolator::build(table)?;
//!
//! // Table nodes are reproduced exactly, far-away samples take the nearest value
//! let log = SampleSeries::new(vec![1200.0, 5000.0, f64::NAN], vec![0.15, 5.0, 0.2])?;
//! let derived = model.evaluate(&log);
//! assert_eq!(derived[0], 18.2);
//! assert_eq!(derived[1], 22.1);
//! assert!(derived[2].is_nan());
//!
//! // Where does the log spend its time?
//! let grid = Grid::from_edges(vec![1000.0, 1250.0, 1500.0], vec![0.1, 0.175, 0.25])?;
//! let log = SampleSeries::new(
//!     vec![1100.0, 1100.0, 1400.0, f64::NAN],
//!     vec![0.12, 0.12, 0.2, 0.2],
//! )?;
//! let concentration = ConcentrationAggregator::new().compute(&log, &grid);
//! assert!((concentration.percentages()[(0, 0)] - 66.67).abs() < 0.01);
//! assert!((concentration.metrics().total_percentage - 100.0).abs() < 1e-9);
//! # Ok::<(), calmap::CalmapError>(())
//! ```
pub mod config;

pub mod overlay_config;

pub mod progress;

mod color;

mod common;

mod comparison;

mod concentration;

mod delaunay;

mod error;

mod filter;

mod grid;

mod interpolator;

mod kdtree;

mod overlay;

mod rtree;

mod series;

mod surface_table;

mod test_functions;

mod timebase;

pub use {
    color::{difference_color, difference_legend_stops, ColorRamp, Rgb},
    common::{create_evaluation_grid, generate_random_points},
    comparison::{difference, max_abs_finite, normalize_to_total, DifferenceKind},
    concentration::{estimated_hours, Concentration, ConcentrationAggregator, Metrics},
    config::{AggregatorParams, OutOfRangePolicy, Params},
    error::{CalmapError, ErrorKind, Result},
    filter::{combine_masks, RangeCondition, RangeFilter},
    grid::{Grid, GridKind},
    interpolator::{Evaluation, SurfaceInterpolator, SurfaceInterpolatorBuilder, ValueSource},
    overlay::{recompute, shade, RenderableSurface, ScatterPoint},
    overlay_config::{OverlayMode, OverlaySettings, OverlaySettingsBuilder},
    series::SampleSeries,
    surface_table::{SurfacePoint, SurfaceTable},
    test_functions::TestSurfaces,
    timebase::{
        align_to_shortest, common_time_base, overlap_window, recommended_raster,
        resample_linear, Extrapolation, SamplingStats, DEFAULT_RASTER,
    },
};
