// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Knobs for a generator, gathered in one place and handed over when
//! the generator is built.

use std::time::Duration;

use colors::Rgb;

/// Newton steps allowed per point unless the caller asks otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000;

/// Requests for more steps per point than this are cut down to it.
pub const MAX_ITERATIONS_CEILING: usize = 1_000_000;

/// Relative closeness needed to count as having reached a root.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Absolute floor added to the closeness test.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// Saturation of every converged pixel.
pub const DEFAULT_SATURATION: f64 = 0.75;

/// What a render does with points that found no root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Paint them with the sentinel color and carry on.
    Sentinel,
    /// Fail the render with the first such point, in grid order.
    Abort,
}

/// Everything a `NewtonFractal` needs besides the polynomial.
#[derive(Clone, Debug)]
pub struct Config {
    /// Newton steps allowed per point.
    pub max_iterations: usize,
    /// Relative tolerance of the root test.
    pub tolerance: f64,
    /// Absolute tolerance of the root test.
    pub absolute_tolerance: f64,
    /// HLS saturation for converged points.
    pub saturation: f64,
    /// Color for points that did not converge.
    pub sentinel: Rgb,
    /// Worker threads requested; clamped to the core count.
    pub concurrency: usize,
    /// Give up on a render that takes longer than this.
    pub timeout: Option<Duration>,
    /// What to do with points that did not converge.
    pub failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            saturation: DEFAULT_SATURATION,
            sentinel: Rgb::BLACK,
            concurrency: num_cpus::get(),
            timeout: None,
            failure_policy: FailurePolicy::Sentinel,
        }
    }
}

impl Config {
    /// The per-point budget actually used: `max_iterations`, capped at
    /// `MAX_ITERATIONS_CEILING`.
    pub fn iteration_budget(&self) -> usize {
        self.max_iterations.min(MAX_ITERATIONS_CEILING)
    }
}
