// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The polynomial whose roots the fractal is drawn around.  It can be
//! described either by its roots or by its coefficients; whichever
//! one is missing is derived when the polynomial is built, along with
//! the derivative, and nothing changes afterwards.

use num::{Complex, Zero};
use std::fmt;

use errors::FractalError;
use roots::find_roots;

/// How the caller wants to describe the polynomial.  Exactly one of
/// the two fields must be set; anything else is a configuration
/// error when the `Polynomial` is built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolynomialConfig {
    /// The roots of the polynomial.  The polynomial built from them
    /// is monic.
    pub roots: Option<Vec<Complex<f64>>>,
    /// Coefficients, indexed by power: `coefficients[k]` multiplies `z^k`.
    pub coefficients: Option<Vec<Complex<f64>>>,
}

impl PolynomialConfig {
    /// Describe a polynomial by its roots.
    pub fn from_roots(roots: Vec<Complex<f64>>) -> Self {
        PolynomialConfig {
            roots: Some(roots),
            coefficients: None,
        }
    }

    /// Describe a polynomial by its coefficients, lowest power first.
    pub fn from_coefficients(coefficients: Vec<Complex<f64>>) -> Self {
        PolynomialConfig {
            roots: None,
            coefficients: Some(coefficients),
        }
    }
}

/// A complex polynomial together with its derivative and its roots.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<Complex<f64>>,
    derivative: Vec<Complex<f64>>,
    roots: Vec<Complex<f64>>,
}

impl Polynomial {
    /// Build from a config, insisting that exactly one of roots or
    /// coefficients was supplied.
    pub fn new(config: &PolynomialConfig) -> Result<Polynomial, FractalError> {
        match (&config.roots, &config.coefficients) {
            (&Some(ref roots), &None) => Polynomial::from_roots(roots),
            (&None, &Some(ref coefficients)) => Polynomial::from_coefficients(coefficients),
            (&Some(_), &Some(_)) => Err(FractalError::config(
                "supply either roots or coefficients, not both",
            )),
            (&None, &None) => Err(FractalError::config(
                "either roots or coefficients must be supplied",
            )),
        }
    }

    /// The monic polynomial with exactly these roots.  The roots are
    /// kept as given.
    pub fn from_roots(roots: &[Complex<f64>]) -> Result<Polynomial, FractalError> {
        if roots.is_empty() {
            return Err(FractalError::config("the root set is empty"));
        }
        if roots.iter().any(|r| !r.is_finite()) {
            return Err(FractalError::config("roots must be finite"));
        }

        // Multiply out (z - r0)(z - r1)... one factor at a time.
        let mut coefficients = vec![Complex::new(1.0, 0.0)];
        for root in roots {
            let mut next = vec![Complex::zero(); coefficients.len() + 1];
            for (power, c) in coefficients.iter().enumerate() {
                next[power + 1] += *c;
                next[power] -= root * c;
            }
            coefficients = next;
        }

        let derivative = differentiate(&coefficients);
        Ok(Polynomial {
            coefficients,
            derivative,
            roots: roots.to_vec(),
        })
    }

    /// The polynomial with these coefficients, lowest power first.
    /// Zero coefficients above the leading term are dropped.
    pub fn from_coefficients(coefficients: &[Complex<f64>]) -> Result<Polynomial, FractalError> {
        if coefficients.is_empty() {
            return Err(FractalError::config("the coefficient sequence is empty"));
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FractalError::config("coefficients must be finite"));
        }
        let degree = match coefficients.iter().rposition(|c| !c.is_zero()) {
            Some(degree) => degree,
            None => return Err(FractalError::config("the polynomial is identically zero")),
        };

        let coefficients = coefficients[..=degree].to_vec();
        let derivative = differentiate(&coefficients);
        let roots = find_roots(&coefficients);
        Ok(Polynomial {
            coefficients,
            derivative,
            roots,
        })
    }

    /// p(z)
    #[inline]
    pub fn evaluate(&self, z: Complex<f64>) -> Complex<f64> {
        horner(&self.coefficients, z)
    }

    /// p'(z)
    #[inline]
    pub fn evaluate_derivative(&self, z: Complex<f64>) -> Complex<f64> {
        horner(&self.derivative, z)
    }

    /// The roots, one per degree.
    pub fn roots(&self) -> &[Complex<f64>] {
        &self.roots
    }

    /// The coefficients, indexed by power.
    pub fn coefficients(&self) -> &[Complex<f64>] {
        &self.coefficients
    }

    /// The coefficients of p', indexed by power.
    pub fn derivative_coefficients(&self) -> &[Complex<f64>] {
        &self.derivative
    }

    /// The degree of the polynomial.
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }
}

/// Renders the polynomial lowest power first, skipping zero terms:
/// `-16.0 + 15.0z^5 + 1.0z^8`.  Used to name output files.
impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (power, c) in self.coefficients.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let negative = c.im == 0.0 && c.re < 0.0;
            if !first {
                f.write_str(if negative { " - " } else { " + " })?;
            } else if negative {
                f.write_str("-")?;
            }
            if c.im == 0.0 {
                write!(f, "{:.1}", c.re.abs())?;
            } else {
                write!(f, "({:.1}{:+.1}i)", c.re, c.im)?;
            }
            match power {
                0 => {}
                1 => f.write_str("z")?,
                _ => write!(f, "z^{}", power)?,
            }
            first = false;
        }
        Ok(())
    }
}

/// Evaluate a coefficient sequence (lowest power first) at `z`.
pub(crate) fn horner(coefficients: &[Complex<f64>], z: Complex<f64>) -> Complex<f64> {
    coefficients
        .iter()
        .rev()
        .fold(Complex::zero(), |acc, c| acc * z + c)
}

pub(crate) fn differentiate(coefficients: &[Complex<f64>]) -> Vec<Complex<f64>> {
    coefficients
        .iter()
        .enumerate()
        .skip(1)
        .map(|(power, c)| c * power as f64)
        .collect()
}
