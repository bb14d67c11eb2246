// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton-Raphson iteration for a single starting point.
//!
//! The iterate is stepped with `z - p(z)/p'(z)` and, after every
//! step, compared against the polynomial's known roots.  A point
//! either lands near one of them, runs out of iterations, or hits a
//! place where the derivative vanishes and the step is undefined.
//! None of those outcomes is an error here; they are all just
//! results, and the caller decides what a failure means.

use num::{Complex, Zero};

use cancel::CancelToken;
use errors::FractalError;
use polynomial::Polynomial;

/// How often, in iterations, a cancellable solve polls its token.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// What became of one starting point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IterationResult {
    /// The iterate came within tolerance of a known root.
    Converged {
        /// The matched root.
        root: Complex<f64>,
        /// Its index in `Polynomial::roots()`.
        root_index: usize,
        /// Newton steps taken; zero only if the start was exactly a root.
        iterations: usize,
    },
    /// The budget ran out (or the solve was cancelled) first.
    NotConverged {
        /// Where the iteration started.
        start: Complex<f64>,
        /// Newton steps taken.
        iterations: usize,
    },
    /// p'(z) was exactly zero, so no step could be taken.
    Singular {
        /// Where the iteration started.
        start: Complex<f64>,
        /// The iterate at which the derivative vanished.
        at: Complex<f64>,
        /// Newton steps taken before reaching it.
        iteration: usize,
    },
}

impl IterationResult {
    /// Whether a root was found.
    pub fn is_converged(&self) -> bool {
        match *self {
            IterationResult::Converged { .. } => true,
            _ => false,
        }
    }

    /// The matched root and iteration count, or the failure as an
    /// error.
    pub fn into_root(self) -> Result<(Complex<f64>, usize), FractalError> {
        match self {
            IterationResult::Converged {
                root, iterations, ..
            } => Ok((root, iterations)),
            IterationResult::NotConverged { start, iterations } => {
                Err(FractalError::NonConvergence { start, iterations })
            }
            IterationResult::Singular {
                start,
                at,
                iteration,
            } => Err(FractalError::Singularity {
                start,
                at,
                iteration,
            }),
        }
    }
}

/// The iteration budget and the closeness test.  A point `z` matches
/// a root `r` when `|z - r| <= absolute_tolerance + tolerance * |r|`.
#[derive(Copy, Clone, Debug)]
pub struct Solver {
    max_iterations: usize,
    tolerance: f64,
    absolute_tolerance: f64,
}

impl Solver {
    /// A solver with a relative tolerance only.
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Solver, FractalError> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(FractalError::config(format!(
                "tolerance must be a positive number, not {}",
                tolerance
            )));
        }
        Ok(Solver {
            max_iterations,
            tolerance,
            absolute_tolerance: 0.0,
        })
    }

    /// Add an absolute floor to the closeness test, so that a root at
    /// the origin can be matched by anything but itself.
    pub fn with_absolute_tolerance(self, absolute_tolerance: f64) -> Result<Solver, FractalError> {
        if !(absolute_tolerance.is_finite() && absolute_tolerance >= 0.0) {
            return Err(FractalError::config(format!(
                "absolute tolerance must be zero or positive, not {}",
                absolute_tolerance
            )));
        }
        Ok(Solver {
            absolute_tolerance,
            ..self
        })
    }

    /// The iteration budget per point.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The relative tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether `z` is close enough to `root` to count as having
    /// reached it.
    #[inline]
    pub fn matches(&self, z: Complex<f64>, root: Complex<f64>) -> bool {
        (z - root).norm() <= self.absolute_tolerance + self.tolerance * root.norm()
    }

    /// The index of the nearest root among those `z` matches; the
    /// lowest index wins a tie.
    pub fn closest_root(&self, z: Complex<f64>, roots: &[Complex<f64>]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, root) in roots.iter().enumerate() {
            if !self.matches(z, *root) {
                continue;
            }
            let distance = (z - root).norm();
            match best {
                Some((_, nearest)) if nearest <= distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Iterate from `start` until it matches a root of `polynomial` or
    /// the budget is spent.
    pub fn solve(&self, start: Complex<f64>, polynomial: &Polynomial) -> IterationResult {
        self.iterate(start, polynomial, || false)
    }

    /// As `solve`, but gives up early, as `NotConverged`, once `cancel`
    /// trips.
    pub fn solve_cancellable(
        &self,
        start: Complex<f64>,
        polynomial: &Polynomial,
        cancel: &CancelToken,
    ) -> IterationResult {
        self.iterate(start, polynomial, || cancel.is_cancelled())
    }

    fn iterate<F>(&self, start: Complex<f64>, polynomial: &Polynomial, cancelled: F) -> IterationResult
    where
        F: Fn() -> bool,
    {
        let roots = polynomial.roots();
        let converged = |z: Complex<f64>, iterations: usize| {
            self.closest_root(z, roots)
                .map(|root_index| IterationResult::Converged {
                    root: roots[root_index],
                    root_index,
                    iterations,
                })
        };

        // Only a start sitting exactly on a root skips the first step;
        // anything merely close has to take it.
        if let Some(root_index) = roots.iter().position(|root| *root == start) {
            return IterationResult::Converged {
                root: start,
                root_index,
                iterations: 0,
            };
        }

        let mut z = start;
        for iteration in 0..self.max_iterations {
            if iteration % CANCEL_CHECK_INTERVAL == 0 && cancelled() {
                return IterationResult::NotConverged {
                    start,
                    iterations: iteration,
                };
            }
            let slope = polynomial.evaluate_derivative(z);
            if slope.is_zero() {
                return IterationResult::Singular {
                    start,
                    at: z,
                    iteration,
                };
            }
            z = z - polynomial.evaluate(z) / slope;
            if !z.is_finite() {
                return IterationResult::NotConverged {
                    start,
                    iterations: iteration + 1,
                };
            }
            if let Some(result) = converged(z, iteration + 1) {
                return result;
            }
        }

        IterationResult::NotConverged {
            start,
            iterations: self.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_minus_one() -> Polynomial {
        Polynomial::from_coefficients(&[
            Complex::new(-1.0, 0.0),
            Complex::zero(),
            Complex::zero(),
            Complex::new(1.0, 0.0),
        ])
        .unwrap()
    }

    // z^3 - 2z + 2: Newton's method cycles 0 -> 1 -> 0 forever.
    fn two_cycle() -> Polynomial {
        Polynomial::from_coefficients(&[
            Complex::new(2.0, 0.0),
            Complex::new(-2.0, 0.0),
            Complex::zero(),
            Complex::new(1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        assert!(Solver::new(10, 0.0).is_err());
        assert!(Solver::new(10, -1e-3).is_err());
        assert!(Solver::new(10, std::f64::NAN).is_err());
        assert!(Solver::new(10, 1e-3).unwrap().with_absolute_tolerance(-1.0).is_err());
    }

    #[test]
    fn starting_on_a_root_converges_immediately() {
        let p = cube_minus_one();
        let solver = Solver::new(50, 1e-3).unwrap();
        for (index, root) in p.roots().iter().enumerate() {
            match solver.solve(*root, &p) {
                IterationResult::Converged {
                    root: found,
                    root_index,
                    iterations,
                } => {
                    assert_eq!(found, *root);
                    assert_eq!(root_index, index);
                    assert!(iterations <= 1);
                }
                other => panic!("expected convergence, got {:?}", other),
            }
        }
    }

    #[test]
    fn converges_to_nearby_root() {
        let p = cube_minus_one();
        let solver = Solver::new(50, 1e-6).unwrap();
        match solver.solve(Complex::new(1.3, 0.1), &p) {
            IterationResult::Converged {
                root, iterations, ..
            } => {
                assert!((root - Complex::new(1.0, 0.0)).norm() < 1e-12);
                assert!(iterations > 0 && iterations < 10);
            }
            other => panic!("expected convergence, got {:?}", other),
        }
    }

    #[test]
    fn zero_budget_does_not_iterate() {
        let p = cube_minus_one();
        let solver = Solver::new(0, 1e-3).unwrap();
        assert_eq!(
            solver.solve(Complex::new(2.0, 2.0), &p),
            IterationResult::NotConverged {
                start: Complex::new(2.0, 2.0),
                iterations: 0,
            }
        );
    }

    #[test]
    fn zero_budget_does_not_accept_a_start_near_a_root() {
        let p = cube_minus_one();
        let start = Complex::new(1.0005, 0.0);
        let solver = Solver::new(0, 1e-3).unwrap();
        assert!(solver.matches(start, Complex::new(1.0, 0.0)));
        assert_eq!(
            solver.solve(start, &p),
            IterationResult::NotConverged {
                start,
                iterations: 0,
            }
        );
    }

    #[test]
    fn a_start_near_a_root_still_takes_a_step() {
        let p = cube_minus_one();
        let solver = Solver::new(50, 1e-3).unwrap();
        match solver.solve(Complex::new(1.0005, 0.0), &p) {
            IterationResult::Converged {
                root, iterations, ..
            } => {
                assert!((root - Complex::new(1.0, 0.0)).norm() < 1e-12);
                assert_eq!(iterations, 1);
            }
            other => panic!("expected convergence, got {:?}", other),
        }
    }

    #[test]
    fn zero_budget_still_recognises_an_exact_root() {
        let p = cube_minus_one();
        let solver = Solver::new(0, 1e-3).unwrap();
        let root = p.roots()[0];
        assert_eq!(
            solver.solve(root, &p),
            IterationResult::Converged {
                root,
                root_index: 0,
                iterations: 0,
            }
        );
    }

    #[test]
    fn cycling_point_exhausts_budget() {
        let p = two_cycle();
        let solver = Solver::new(50, 1e-3).unwrap();
        let result = solver.solve(Complex::zero(), &p);
        assert_eq!(
            result,
            IterationResult::NotConverged {
                start: Complex::zero(),
                iterations: 50,
            }
        );
        match result.into_root() {
            Err(FractalError::NonConvergence { iterations: 50, .. }) => {}
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn vanishing_derivative_is_singular() {
        let p = cube_minus_one();
        let solver = Solver::new(50, 1e-3).unwrap();
        let result = solver.solve(Complex::zero(), &p);
        assert_eq!(
            result,
            IterationResult::Singular {
                start: Complex::zero(),
                at: Complex::zero(),
                iteration: 0,
            }
        );
        assert!(!result.is_converged());
        match result.into_root() {
            Err(FractalError::Singularity { .. }) => {}
            other => panic!("expected a singularity, got {:?}", other),
        }
    }

    #[test]
    fn constant_polynomial_is_singular_everywhere() {
        let p = Polynomial::from_coefficients(&[Complex::new(3.0, 0.0)]).unwrap();
        let solver = Solver::new(50, 1e-3).unwrap();
        match solver.solve(Complex::new(0.5, 0.5), &p) {
            IterationResult::Singular { iteration: 0, .. } => {}
            other => panic!("expected a singularity, got {:?}", other),
        }
    }

    #[test]
    fn relative_tolerance_alone_never_matches_near_the_origin() {
        let roots = [Complex::zero(), Complex::new(2.0, 0.0)];
        let z = Complex::new(1e-12, 0.0);
        let relative = Solver::new(10, 1e-3).unwrap();
        assert_eq!(relative.closest_root(z, &roots), None);
        let floored = relative.with_absolute_tolerance(1e-8).unwrap();
        assert_eq!(floored.closest_root(z, &roots), Some(0));
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        let roots = [Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)];
        let solver = Solver::new(10, 1e-3).unwrap();
        assert_eq!(solver.closest_root(Complex::new(1.0005, 0.0), &roots), Some(0));
    }

    #[test]
    fn cancelled_solve_stops_before_iterating() {
        let p = two_cycle();
        let solver = Solver::new(1_000_000, 1e-3).unwrap();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            solver.solve_cancellable(Complex::zero(), &p, &token),
            IterationResult::NotConverged {
                start: Complex::zero(),
                iterations: 0,
            }
        );
    }
}
