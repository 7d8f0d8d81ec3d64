/////////////////////////////////////////////////////////////////////////////////////////////
//
// Maps concentration and difference values onto display colours.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// HSL lightness in `0..=255`, used to pick black or white label text.
    pub fn lightness(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b) as u16;
        let min = self.r.min(self.g).min(self.b) as u16;
        ((max + min) / 2) as u8
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]` and channels truncate.
    fn lerp(&self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)) as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

/// Two-colour ramp with a power-law bias and an optional fixed value range.
///
/// `bias` below 1 spreads the low end of the ramp; above 1 it spreads the
/// high end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRamp {
    pub min_color: Rgb,
    pub max_color: Rgb,
    pub bias: f64,

    /// `Some((min, max))` pins the ramp; `None` spans `0..=max_value`.
    pub manual_range: Option<(f64, f64)>,
}

impl Default for ColorRamp {
    fn default() -> Self {
        ColorRamp {
            min_color: Rgb::WHITE,
            max_color: Rgb::new(0, 100, 255),
            bias: 1.0,
            manual_range: None,
        }
    }
}

impl ColorRamp {
    fn range(&self, max_value: f64) -> (f64, f64) {
        self.manual_range.unwrap_or((0.0, max_value))
    }

    /// Colour for `value` when the largest value on display is `max_value`.
    ///
    /// # Example
    /// ```
    /// use calmap::{ColorRamp, Rgb};
    ///
    /// let ramp = ColorRamp::default();
    /// assert_eq!(ramp.color(0.0, 40.0), Rgb::WHITE);
    /// assert_eq!(ramp.color(40.0, 40.0), ramp.max_color);
    /// ```
    pub fn color(&self, value: f64, max_value: f64) -> Rgb {
        if max_value == 0.0 || value.is_nan() {
            return self.min_color;
        }
        let (lo, hi) = self.range(max_value);
        if hi <= lo {
            return self.min_color;
        }
        let ratio = ((value.clamp(lo, hi) - lo) / (hi - lo)).powf(self.bias);
        self.min_color.lerp(self.max_color, ratio)
    }

    /// Eleven evenly spaced `(value, colour)` legend entries across the ramp's range.
    pub fn legend_stops(&self, max_value: f64) -> Vec<(f64, Rgb)> {
        let (lo, hi) = self.range(max_value);
        (0..=10)
            .map(|i| {
                let v = lo + (hi - lo) * (i as f64 / 10.0);
                (v, self.color(v, hi))
            })
            .collect()
    }
}

/// Diverging colour for a signed difference: white at zero, towards red for
/// negative and towards green for positive values, saturating at `max_abs`.
///
/// # Example
/// ```
/// use calmap::{difference_color, Rgb};
///
/// assert_eq!(difference_color(-5.0, 5.0, 1.0), Rgb::new(255, 0, 0));
/// assert_eq!(difference_color(10.0, 5.0, 1.0), Rgb::new(0, 255, 0));
/// assert_eq!(difference_color(0.0, 5.0, 1.0), Rgb::WHITE);
/// ```
pub fn difference_color(value: f64, max_abs: f64, bias: f64) -> Rgb {
    if max_abs == 0.0 || value.is_nan() || value == 0.0 {
        return Rgb::WHITE;
    }
    let clamped = value.clamp(-max_abs, max_abs);
    let fade = (255.0 * (1.0 - (clamped.abs() / max_abs).powf(bias))) as u8;
    if clamped < 0.0 {
        Rgb::new(255, fade, fade)
    } else {
        Rgb::new(fade, 255, fade)
    }
}

/// Eleven legend entries for a difference scale spanning `-max_abs..=max_abs`.
pub fn difference_legend_stops(max_abs: f64, bias: f64) -> Vec<(f64, Rgb)> {
    (0..=10)
        .map(|i| {
            let v = -max_abs + 2.0 * max_abs * (i as f64 / 10.0);
            (v, difference_color(v, max_abs, bias))
        })
        .collect()
}
