// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The generator: a polynomial, a solver, a color mapper and a worker
//! pool, fixed at construction and shared read-only by every worker
//! during a render.

use num::Complex;
use std::time::Instant;

use cancel::CancelToken;
use canvas::Image;
use colors::{ColorMapper, Rgb};
use config::{Config, FailurePolicy};
use errors::FractalError;
use grid::SampleGrid;
use polynomial::{Polynomial, PolynomialConfig};
use scheduler::GridScheduler;
use solver::{IterationResult, Solver};

/// How the points of a render fared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Points that reached a root.
    pub converged: usize,
    /// Points that ran out of iterations.
    pub not_converged: usize,
    /// Points where the derivative vanished.
    pub singular: usize,
}

impl Report {
    /// Points that got the sentinel color.
    pub fn failures(&self) -> usize {
        self.not_converged + self.singular
    }

    /// Every point counted.
    pub fn total(&self) -> usize {
        self.converged + self.failures()
    }

    fn record(&mut self, result: &IterationResult) {
        match *result {
            IterationResult::Converged { .. } => self.converged += 1,
            IterationResult::NotConverged { .. } => self.not_converged += 1,
            IterationResult::Singular { .. } => self.singular += 1,
        }
    }
}

/// A finished render.
#[derive(Clone, Debug)]
pub struct Render {
    /// The picture.
    pub image: Image,
    /// Per-point outcome counts.
    pub report: Report,
}

/// A Newton fractal generator for one polynomial.
#[derive(Debug)]
pub struct NewtonFractal {
    polynomial: Polynomial,
    solver: Solver,
    colors: ColorMapper,
    scheduler: GridScheduler,
    config: Config,
}

impl NewtonFractal {
    /// Build a generator, checking every setting in `config`.  An
    /// iteration budget above the ceiling is capped here, once.
    pub fn new(polynomial: Polynomial, config: &Config) -> Result<NewtonFractal, FractalError> {
        let budget = config.iteration_budget();
        if budget < config.max_iterations {
            warn!(
                "{} iterations per point requested, capping at {}",
                config.max_iterations, budget
            );
        }
        let config = Config {
            max_iterations: budget,
            ..config.clone()
        };
        let solver = Solver::new(config.max_iterations, config.tolerance)?
            .with_absolute_tolerance(config.absolute_tolerance)?;
        let colors = ColorMapper::new(config.saturation)?.with_sentinel(config.sentinel)?;
        let scheduler = GridScheduler::new(config.concurrency)?;
        Ok(NewtonFractal {
            polynomial,
            solver,
            colors,
            scheduler,
            config,
        })
    }

    /// Build the polynomial from roots or coefficients, then the
    /// generator.
    pub fn from_config(
        polynomial: &PolynomialConfig,
        config: &Config,
    ) -> Result<NewtonFractal, FractalError> {
        NewtonFractal::new(Polynomial::new(polynomial)?, config)
    }

    /// The polynomial being drawn.
    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// The settings this generator was built with, with the iteration
    /// budget as capped.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run Newton's method from a single point.
    pub fn compute_point(&self, z: Complex<f64>) -> IterationResult {
        self.solver.solve(z, &self.polynomial)
    }

    /// The color a single point would get.
    pub fn color_point(&self, z: Complex<f64>) -> Rgb {
        self.colors.color(&self.compute_point(z))
    }

    /// Render every point of `grid`, honouring the configured timeout.
    pub fn render(&self, grid: &SampleGrid) -> Result<Render, FractalError> {
        let cancel = match self.config.timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        };
        self.render_with(grid, &cancel)
    }

    /// Render every point of `grid`, stopping if `cancel` trips.
    pub fn render_with(
        &self,
        grid: &SampleGrid,
        cancel: &CancelToken,
    ) -> Result<Render, FractalError> {
        info!(
            "rendering {} on a {}x{} grid over {:?} x {:?}i with {} workers, {} iterations at tolerance {}",
            self.polynomial,
            grid.resolution(),
            grid.resolution(),
            grid.real_range(),
            grid.imag_range(),
            self.scheduler.workers(),
            self.solver.max_iterations(),
            self.solver.tolerance()
        );
        let started = Instant::now();

        let outcomes = self.scheduler.run(grid, cancel, |point, cancel| {
            let result = self.solver.solve_cancellable(point, &self.polynomial, cancel);
            (result, self.colors.color(&result))
        })?;

        let mut report = Report::default();
        let mut pixels = Vec::with_capacity(outcomes.len());
        for (result, color) in outcomes {
            if self.config.failure_policy == FailurePolicy::Abort {
                result.into_root()?;
            }
            report.record(&result);
            pixels.push(color);
        }

        if report.failures() > 0 {
            warn!(
                "{} of {} points found no root ({} out of iterations, {} singular)",
                report.failures(),
                report.total(),
                report.not_converged,
                report.singular
            );
        }
        let elapsed = started.elapsed();
        info!(
            "rendered {} points in {}.{:03}s",
            report.total(),
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );

        Ok(Render {
            image: Image::new(grid.resolution(), pixels)?,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::MAX_ITERATIONS_CEILING;
    use num::Zero;

    fn cube_minus_one(config: &Config) -> NewtonFractal {
        let coefficients = vec![
            Complex::new(-1.0, 0.0),
            Complex::zero(),
            Complex::zero(),
            Complex::new(1.0, 0.0),
        ];
        NewtonFractal::from_config(&PolynomialConfig::from_coefficients(coefficients), config)
            .unwrap()
    }

    #[test]
    fn bad_settings_are_configuration_errors() {
        let configs = vec![
            Config {
                tolerance: 0.0,
                ..Config::default()
            },
            Config {
                saturation: 2.0,
                ..Config::default()
            },
            Config {
                concurrency: 0,
                ..Config::default()
            },
            Config {
                sentinel: Rgb(-1.0, 0.0, 0.0),
                ..Config::default()
            },
        ];
        let polynomial = PolynomialConfig::from_roots(vec![Complex::new(1.0, 0.0)]);
        for config in &configs {
            match NewtonFractal::from_config(&polynomial, config) {
                Err(FractalError::Configuration(_)) => {}
                other => panic!("expected a configuration error, got {:?}", other),
            }
        }
    }

    #[test]
    fn huge_budgets_are_capped_at_construction() {
        let fractal = cube_minus_one(&Config {
            max_iterations: 1_000_000_000,
            ..Config::default()
        });
        assert_eq!(fractal.config().max_iterations, MAX_ITERATIONS_CEILING);
        assert_eq!(fractal.solver.max_iterations(), MAX_ITERATIONS_CEILING);

        let modest = cube_minus_one(&Config {
            max_iterations: 7,
            tolerance: 1e-4,
            saturation: 0.5,
            ..Config::default()
        });
        assert_eq!(modest.config().max_iterations, 7);
        assert_eq!(modest.solver.max_iterations(), 7);
        assert_eq!(modest.solver.tolerance(), 1e-4);
        assert_eq!(modest.colors.saturation(), 0.5);
        assert_eq!(modest.colors.sentinel(), Rgb::BLACK);
    }

    #[test]
    fn origin_is_painted_with_the_sentinel() {
        let fractal = cube_minus_one(&Config {
            concurrency: 2,
            ..Config::default()
        });
        // 3x3 over [-1, 1]^2 puts the centre sample on the origin,
        // where the derivative of z^3 - 1 vanishes.
        let grid = SampleGrid::new((-1.0, 1.0), (-1.0, 1.0), 3).unwrap();
        let render = fractal.render(&grid).unwrap();
        assert_eq!(render.image.get(1, 1), Some(Rgb::BLACK));
        assert_eq!(render.report.singular, 1);
        assert_eq!(render.report.total(), 9);
        assert_eq!(render.report.converged, 8);
    }

    #[test]
    fn abort_policy_surfaces_the_failure() {
        let fractal = cube_minus_one(&Config {
            concurrency: 2,
            failure_policy: FailurePolicy::Abort,
            ..Config::default()
        });
        let grid = SampleGrid::new((-1.0, 1.0), (-1.0, 1.0), 3).unwrap();
        match fractal.render(&grid) {
            Err(FractalError::Singularity { start, .. }) => assert_eq!(start, Complex::zero()),
            other => panic!("expected a singularity, got {:?}", other.map(|r| r.report)),
        }
    }

    #[test]
    fn color_point_matches_the_render() {
        let fractal = cube_minus_one(&Config {
            concurrency: 3,
            ..Config::default()
        });
        let grid = SampleGrid::new((-1.5, 1.5), (-1.5, 1.5), 6).unwrap();
        let render = fractal.render(&grid).unwrap();
        for (point, pixel) in grid.points().zip(render.image.pixels()) {
            assert_eq!(fractal.color_point(point), *pixel);
        }
    }
}
