// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Finds every root of a polynomial at once with the Aberth–Ehrlich
//! method.  Each estimate takes a Newton step that is pushed away from
//! all the other estimates, so they cannot collapse onto the same
//! root.

use num::{Complex, Zero};
use std::cmp::Ordering;
use std::f64::consts::PI;

use polynomial::{differentiate, horner};

const MAX_SWEEPS: usize = 500;
const SETTLED: f64 = 1e-14;

/// All roots of a polynomial whose leading coefficient is non-zero,
/// sorted by real then imaginary part.
pub(crate) fn find_roots(coefficients: &[Complex<f64>]) -> Vec<Complex<f64>> {
    // z^k factors give exact zero roots; pull them out before iterating.
    let zeros = coefficients.iter().take_while(|c| c.is_zero()).count();
    let reduced = &coefficients[zeros..];

    let mut roots = vec![Complex::zero(); zeros];
    match reduced.len() {
        0 | 1 => {}
        2 => roots.push(-reduced[0] / reduced[1]),
        _ => roots.extend(aberth(reduced)),
    }
    roots.sort_by(|a, b| {
        a.re.partial_cmp(&b.re)
            .unwrap_or(Ordering::Equal)
            .then(a.im.partial_cmp(&b.im).unwrap_or(Ordering::Equal))
    });
    roots
}

fn aberth(coefficients: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let degree = coefficients.len() - 1;
    let lead = coefficients[degree];
    let monic: Vec<Complex<f64>> = coefficients.iter().map(|c| c / lead).collect();
    let slope = differentiate(&monic);

    // The constant term of a monic polynomial is the product of its
    // roots, so this radius is their geometric mean modulus.
    let radius = monic[0].norm().powf(1.0 / degree as f64);
    let mut roots: Vec<Complex<f64>> = (0..degree)
        .map(|k| Complex::from_polar(&radius, &(2.0 * PI * k as f64 / degree as f64 + 0.4)))
        .collect();

    for _ in 0..MAX_SWEEPS {
        let mut settled = true;
        for k in 0..degree {
            let z = roots[k];
            let value = horner(&monic, z);
            if value.is_zero() {
                continue;
            }
            let repulsion = roots
                .iter()
                .enumerate()
                .filter(|&(j, w)| j != k && *w != z)
                .fold(Complex::zero(), |acc: Complex<f64>, (_, w)| acc + (z - w).inv());
            let denominator = horner(&slope, z) / value - repulsion;
            if denominator.is_zero() || !denominator.is_finite() {
                continue;
            }
            let step = denominator.inv();
            roots[k] = z - step;
            if step.norm() > SETTLED * (1.0 + roots[k].norm()) {
                settled = false;
            }
        }
        if settled {
            break;
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_out_zero_roots_exactly() {
        // z^2 (z - 2)
        let roots = find_roots(&[
            Complex::zero(),
            Complex::zero(),
            Complex::new(-2.0, 0.0),
            Complex::new(1.0, 0.0),
        ]);
        assert_eq!(roots[0], Complex::zero());
        assert_eq!(roots[1], Complex::zero());
        assert!((roots[2] - Complex::new(2.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn roots_come_out_sorted() {
        // (z - 3)(z + 1)(z - i)
        let coefficients = [
            Complex::new(0.0, 3.0),
            Complex::new(-3.0, 2.0),
            Complex::new(-2.0, -1.0),
            Complex::new(1.0, 0.0),
        ];
        let roots = find_roots(&coefficients);
        let expected = [
            Complex::new(-1.0, 0.0),
            Complex::new(0.0, 1.0),
            Complex::new(3.0, 0.0),
        ];
        for (found, expected) in roots.iter().zip(expected.iter()) {
            assert!((found - expected).norm() < 1e-10, "{} != {}", found, expected);
        }
    }

    #[test]
    fn separates_close_roots() {
        // (z - 1)(z - 1.001)
        let roots = find_roots(&[
            Complex::new(1.001, 0.0),
            Complex::new(-2.001, 0.0),
            Complex::new(1.0, 0.0),
        ]);
        assert!((roots[0] - Complex::new(1.0, 0.0)).norm() < 1e-9);
        assert!((roots[1] - Complex::new(1.001, 0.0)).norm() < 1e-9);
    }
}
