// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the SampleGrid struct, which describes a relationship
//! between an N×N integral grid with an origin at 0,0 and the
//! rectangle of the complex plane the fractal is sampled over.
//!
//! Both axes are sampled by linear interpolation with the endpoints
//! included.  The grid is stored row-major with the imaginary axis
//! varying slowest: row `i` holds the `i`th imaginary value, column
//! `j` the `j`th real value, and the flat index is `i * N + j`.
use itertools::iproduct;
use num::Complex;

use errors::FractalError;

/// The row and column of a sample in the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// An N×N sampling of a rectangle of the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampleGrid {
    real: (f64, f64),
    imag: (f64, f64),
    resolution: usize,
}

impl SampleGrid {
    /// The ranges are `(first, last)` pairs and may run in either
    /// direction.  The resolution is the number of samples per axis.
    pub fn new(
        real: (f64, f64),
        imag: (f64, f64),
        resolution: usize,
    ) -> Result<SampleGrid, FractalError> {
        if resolution == 0 {
            return Err(FractalError::config("the grid resolution must be at least 1"));
        }
        if resolution.checked_mul(resolution).is_none() {
            return Err(FractalError::config(format!(
                "a {0}x{0} grid has more samples than can be counted",
                resolution
            )));
        }
        if ![real.0, real.1, imag.0, imag.1].iter().all(|v| v.is_finite()) {
            return Err(FractalError::config("the grid bounds must be finite"));
        }
        Ok(SampleGrid {
            real,
            imag,
            resolution,
        })
    }

    /// Samples per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// The real range, as given.
    pub fn real_range(&self) -> (f64, f64) {
        self.real
    }

    /// The imaginary range, as given.
    pub fn imag_range(&self) -> (f64, f64) {
        self.imag
    }

    /// The total number of samples.
    pub fn len(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Never true; a grid always has at least one sample.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The complex number sampled at a pixel.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            interpolate(self.real, self.resolution, pixel.1),
            interpolate(self.imag, self.resolution, pixel.0),
        )
    }

    /// The flat, row-major index of a pixel.
    pub fn pixel_to_offset(&self, pixel: &Pixel) -> usize {
        pixel.0 * self.resolution + pixel.1
    }

    /// The pixel at a flat, row-major index.
    pub fn offset_to_pixel(&self, offset: usize) -> Pixel {
        Pixel(offset / self.resolution, offset % self.resolution)
    }

    /// Every sample, in row-major order.
    pub fn points<'a>(&'a self) -> impl Iterator<Item = Complex<f64>> + 'a {
        iproduct!(0..self.resolution, 0..self.resolution)
            .map(move |(row, column)| self.pixel_to_point(&Pixel(row, column)))
    }
}

// The last sample is pinned to the end of the range so that rounding
// never leaves it short.
fn interpolate(range: (f64, f64), samples: usize, k: usize) -> f64 {
    if samples == 1 || k == 0 {
        return range.0;
    }
    if k == samples - 1 {
        return range.1;
    }
    let step = (range.1 - range.0) / (samples - 1) as f64;
    range.0 + step * k as f64
}
