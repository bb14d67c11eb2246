// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type every fallible operation in the crate returns.

use num::Complex;

/// Everything that can go wrong while building a generator or
/// rendering with it.  Configuration problems surface at
/// construction; the per-point variants only escape a render when
/// the generator is asked to abort on failure.
#[derive(Debug, Fail)]
pub enum FractalError {
    /// The caller asked for something that cannot be built: an
    /// ambiguous or empty polynomial, a degenerate grid, a bad
    /// tolerance, and so on.
    #[fail(display = "configuration error: {}", _0)]
    Configuration(String),

    /// The derivative vanished, so the Newton step is undefined.
    #[fail(
        display = "derivative vanished at {} on iteration {} (started from {})",
        at, iteration, start
    )]
    Singularity {
        /// Where the iteration started.
        start: Complex<f64>,
        /// The iterate at which p'(z) was zero.
        at: Complex<f64>,
        /// How many steps had been taken when it happened.
        iteration: usize,
    },

    /// The iteration budget ran out before any known root matched.
    #[fail(
        display = "no root matched after {} iterations (started from {})",
        iterations, start
    )]
    NonConvergence {
        /// Where the iteration started.
        start: Complex<f64>,
        /// The number of steps attempted.
        iterations: usize,
    },

    /// The batch was cancelled, either explicitly or by its deadline.
    #[fail(display = "render cancelled after {} of {} points", completed, total)]
    Cancelled {
        /// Points that produced a result before cancellation.
        completed: usize,
        /// Points in the grid.
        total: usize,
    },

    /// A worker thread panicked.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}

impl FractalError {
    pub(crate) fn config<S: Into<String>>(message: S) -> Self {
        FractalError::Configuration(message.into())
    }
}
