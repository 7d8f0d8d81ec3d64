/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides analytic surfaces for validating and demonstrating surface table interpolation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;

/// Analytic 2D surfaces used to generate table values for tests and examples.
pub struct TestSurfaces;

impl TestSurfaces {
    /// Franke's two-dimensional test function on the unit square:
    /// <div>
    /// $$
    /// \begin{aligned}
    /// F(x,y) &=
    /// \tfrac{3}{4}\exp\!\left[-\frac{(9x-2)^2 + (9y-2)^2}{4}\right]
    /// + \tfrac{3}{4}\exp\!\left[-\frac{(9x+1)^2}{49} - \frac{(9y+1)^2}{10}\right] \\[6pt]
    /// &\quad+ \tfrac{1}{2}\exp\!\left[-\frac{(9x-7)^2 + (9y-3)^2}{4}\right]
    /// - \tfrac{1}{5}\exp\!\left[-(9x-4)^2 - (9y-7)^2\right]
    /// \end{aligned}
    /// $$
    /// </div>
    ///
    /// `points` is `(n × 2)`; the result is `(n × 1)`.
    pub fn franke_2d(points: &Mat<f64>) -> Mat<f64> {
        assert_eq!(points.ncols(), 2);

        Mat::from_fn(points.nrows(), 1, |i, _| {
            let nx = 9.0 * points[(i, 0)];
            let ny = 9.0 * points[(i, 1)];

            let term1 = 0.75 * (-((nx - 2.0).powi(2) + (ny - 2.0).powi(2)) / 4.0).exp();
            let term2 = 0.75 * (-(nx + 1.0).powi(2) / 49.0 - (ny + 1.0).powi(2) / 10.0).exp();
            let term3 = 0.5 * (-((nx - 7.0).powi(2) + (ny - 3.0).powi(2)) / 4.0).exp();
            let term4 = -0.2 * (-(nx - 4.0).powi(2) - (ny - 7.0).powi(2)).exp();

            term1 + term2 + term3 + term4
        })
    }

    /// A fuel-consumption-like bowl over engine speed and load.
    ///
    /// Minimum of 200 at 2200 rpm and 0.6 load, rising quadratically away
    /// from it and steeply at very low load.
    pub fn consumption_bowl(rpm: f64, etasp: f64) -> f64 {
        let speed = (rpm - 2200.0) / 1000.0;
        let load = etasp - 0.6;
        200.0 + 35.0 * speed * speed + 180.0 * load * load + 12.0 / (etasp + 0.1)
    }
}
