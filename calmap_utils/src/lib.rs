/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports axis, binning, and matrix helpers used across the calmap crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the `calmap` crate
//!
//! Small, dependency-light helpers for building and querying the rectilinear
//! axes of a calibration map: distinct axis values, evenly spaced axes,
//! histogram binning with clamped ends, and nearest-center lookup.
mod axis;
mod utils;

pub use {
    axis::{
        arange, centers_to_edges, digitize_clamped, first_non_increasing, linspace, midpoints,
        nearest_index, unique_sorted,
    },
    utils::{argmax, finite_extents, format_hms, nan_sum},
};
