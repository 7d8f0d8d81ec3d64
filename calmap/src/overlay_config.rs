/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies rendering mode, shading, and scatter options for concentration overlays.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies rendering mode, shading, and scatter options for concentration overlays.
use crate::error::{CalmapError, Result};
use serde::{Deserialize, Serialize};

/// How a concentration overlay is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// A continuous shaded surface.
    #[default]
    Gradient,

    /// Randomly placed dots whose number follows the cell concentration.
    Scatter,
}

#[doc = include_str!("../docs/overlay_settings.md")]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Gradient or scatter rendering.
    pub mode: OverlayMode,

    /// Overlay transparency in `[0, 1]`; `1` is fully transparent.
    pub transparency: f64,

    /// Multiplier applied to the normalised concentration, `[0.1, 3.0]`.
    pub intensity: f64,

    /// Exponent applied after intensity scaling, `[0.1, 3.0]`.
    pub gamma: f64,

    /// Whether the resampled surface is smoothed before shading.
    pub blur_enabled: bool,

    /// Marker size for scatter mode, `[1, 20]`.
    pub scatter_size: f64,

    /// Scatter points per percent of concentration, `[0.1, 5.0]`.
    pub scatter_density: f64,

    /// Resampling factor per axis for the gradient surface, `[1, 16]`.
    pub upsample: usize,

    /// Seed for scatter point placement.
    pub seed: u64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        OverlaySettings {
            mode: OverlayMode::Gradient,
            transparency: 0.3,
            intensity: 1.0,
            gamma: 1.0,
            blur_enabled: false,
            scatter_size: 5.0,
            scatter_density: 1.0,
            upsample: 4,
            seed: 42,
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(CalmapError::InvalidConfiguration {
            field,
            value,
            min,
            max,
        })
    }
}

impl OverlaySettings {
    /// Returns a new [`OverlaySettingsBuilder`] for the given mode.
    pub fn builder(mode: OverlayMode) -> OverlaySettingsBuilder {
        OverlaySettingsBuilder::new(mode)
    }

    /// Checks every option against its documented range.
    ///
    /// NaN values are always rejected.
    pub fn validate(&self) -> Result<()> {
        check_range("transparency", self.transparency, 0.0, 1.0)?;
        check_range("intensity", self.intensity, 0.1, 3.0)?;
        check_range("gamma", self.gamma, 0.1, 3.0)?;
        check_range("scatter_size", self.scatter_size, 1.0, 20.0)?;
        check_range("scatter_density", self.scatter_density, 0.1, 5.0)?;
        check_range("upsample", self.upsample as f64, 1.0, 16.0)?;
        Ok(())
    }
}

/// A convenience builder for constructing validated [`OverlaySettings`].
///
/// The builder should be called via the [`OverlaySettings::builder`] method.
#[derive(Debug, Clone)]
pub struct OverlaySettingsBuilder {
    settings: OverlaySettings,
}

impl OverlaySettingsBuilder {
    fn new(mode: OverlayMode) -> Self {
        Self {
            settings: OverlaySettings {
                mode,
                ..OverlaySettings::default()
            },
        }
    }

    /// Sets the overlay transparency.
    pub fn transparency(mut self, transparency: f64) -> Self {
        self.settings.transparency = transparency;
        self
    }

    /// Sets the intensity multiplier.
    pub fn intensity(mut self, intensity: f64) -> Self {
        self.settings.intensity = intensity;
        self
    }

    /// Sets the gamma exponent.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.settings.gamma = gamma;
        self
    }

    /// Enables or disables smoothing.
    pub fn blur_enabled(mut self, blur_enabled: bool) -> Self {
        self.settings.blur_enabled = blur_enabled;
        self
    }

    /// Sets the scatter marker size.
    pub fn scatter_size(mut self, scatter_size: f64) -> Self {
        self.settings.scatter_size = scatter_size;
        self
    }

    /// Sets the scatter density.
    pub fn scatter_density(mut self, scatter_density: f64) -> Self {
        self.settings.scatter_density = scatter_density;
        self
    }

    /// Sets the per-axis resampling factor.
    pub fn upsample(mut self, upsample: usize) -> Self {
        self.settings.upsample = upsample;
        self
    }

    /// Sets the scatter seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }

    /// Validates and returns the [`OverlaySettings`].
    pub fn build(self) -> Result<OverlaySettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_valid() {
        assert!(OverlaySettings::default().validate().is_ok());
        assert!(OverlaySettings::builder(OverlayMode::Scatter).build().is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            OverlaySettings::builder(OverlayMode::Gradient).transparency(1.5).build(),
            OverlaySettings::builder(OverlayMode::Gradient).intensity(0.05).build(),
            OverlaySettings::builder(OverlayMode::Gradient).gamma(f64::NAN).build(),
            OverlaySettings::builder(OverlayMode::Scatter).scatter_size(25.0).build(),
            OverlaySettings::builder(OverlayMode::Scatter).scatter_density(0.0).build(),
            OverlaySettings::builder(OverlayMode::Gradient).upsample(0).build(),
        ];
        for case in cases {
            let err = case.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let settings = OverlaySettings::builder(OverlayMode::Scatter)
            .transparency(1.0)
            .intensity(3.0)
            .gamma(0.1)
            .scatter_size(1.0)
            .scatter_density(5.0)
            .upsample(16)
            .build();
        assert!(settings.is_ok());
    }

    #[test]
    fn record_from_shell_json() {
        let json = r#"{
            "mode": "scatter",
            "transparency": 0.5,
            "intensity": 2.0,
            "gamma": 0.8,
            "blur_enabled": true,
            "scatter_size": 4,
            "scatter_density": 1.5
        }"#;
        let settings: OverlaySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.mode, OverlayMode::Scatter);
        assert!(settings.blur_enabled);
        assert_eq!(settings.upsample, OverlaySettings::default().upsample);
        assert!(settings.validate().is_ok());
    }
}
