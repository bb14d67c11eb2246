#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton fractal generator
//!
//! Newton's method finds a root of a polynomial by repeatedly sliding
//! down the tangent line: from a guess `z`, the next guess is
//! `z - p(z)/p'(z)`.  Which root it ends up at depends, often wildly,
//! on where it started.  Coloring every starting point in a patch of
//! the complex plane by the root it reaches (the hue) and by how long
//! it took to get there (the lightness) draws the basins of
//! attraction of the roots, and their boundaries are fractal.
//!
//! Every point is independent of every other, so the grid is spread
//! across a pool of worker threads and the results are put back in
//! order afterwards.  Points that never reach a root, or that land
//! where the derivative vanishes, are painted with a sentinel color
//! and counted rather than allowed to spoil the whole picture.
//!
//! ```no_run
//! extern crate newton_fractal;
//! extern crate num;
//!
//! use newton_fractal::{generate, PolynomialConfig};
//! use num::Complex;
//!
//! let cube_roots = PolynomialConfig::from_coefficients(vec![
//!     Complex::new(-1.0, 0.0),
//!     Complex::new(0.0, 0.0),
//!     Complex::new(0.0, 0.0),
//!     Complex::new(1.0, 0.0),
//! ]);
//! let image = generate(&cube_roots, (-2.0, 2.0), (-2.0, 2.0), 200, 4, 1000, 1e-3).unwrap();
//! image.save("cube_roots.png").unwrap();
//! ```

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

#[cfg(test)]
extern crate rand;

pub mod cancel;
pub mod canvas;
pub mod colors;
pub mod config;
pub mod errors;
pub mod fractal;
pub mod grid;
pub mod polynomial;
mod roots;
pub mod scheduler;
pub mod solver;

pub use cancel::CancelToken;
pub use canvas::Image;
pub use colors::{ColorMapper, Rgb};
pub use config::{Config, FailurePolicy};
pub use errors::FractalError;
pub use fractal::{NewtonFractal, Render, Report};
pub use grid::{Pixel, SampleGrid};
pub use polynomial::{Polynomial, PolynomialConfig};
pub use scheduler::{GridScheduler, Progress};
pub use solver::{IterationResult, Solver};

/// Render a `resolution`×`resolution` Newton fractal of the described
/// polynomial over the given real and imaginary ranges.  Every other
/// setting takes its default; points that find no root are painted
/// black.
pub fn generate(
    polynomial: &PolynomialConfig,
    real_range: (f64, f64),
    imag_range: (f64, f64),
    resolution: usize,
    concurrency: usize,
    max_iterations: usize,
    tolerance: f64,
) -> Result<Image, FractalError> {
    let config = Config {
        concurrency,
        max_iterations,
        tolerance,
        ..Config::default()
    };
    let fractal = NewtonFractal::from_config(polynomial, &config)?;
    let grid = SampleGrid::new(real_range, imag_range, resolution)?;
    fractal.render(&grid).map(|render| render.image)
}
