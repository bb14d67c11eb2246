// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps a solver result to a color.  The root picks the hue (its
//! angle around the origin), the iteration count picks the lightness
//! (darker the longer it took), and saturation is fixed.

use num::Complex;
use std::f64::consts::PI;

use errors::FractalError;
use solver::IterationResult;

const ONE_THIRD: f64 = 1.0 / 3.0;
const ONE_SIXTH: f64 = 1.0 / 6.0;
const TWO_THIRDS: f64 = 2.0 / 3.0;

/// An RGB color, each channel in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    /// Black, the default color for points that found no root.
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// Whether every channel is in [0, 1].
    pub fn is_valid(&self) -> bool {
        [self.0, self.1, self.2]
            .iter()
            .all(|c| *c >= 0.0 && *c <= 1.0)
    }
}

/// The hue for a root: its argument as a fraction of a full turn, in
/// [0, 1).
pub fn hue(root: Complex<f64>) -> f64 {
    let turn = (root.arg() / (2.0 * PI)).rem_euclid(1.0);
    // A tiny negative angle rounds up to exactly one turn.
    if turn >= 1.0 {
        0.0
    } else {
        turn
    }
}

/// 0.5 for a point that needed no iterations, falling towards 0 as
/// the count grows.
pub fn lightness(iterations: usize) -> f64 {
    0.5 / (1.0 + 0.18 * iterations as f64)
}

/// The usual hue/lightness/saturation to RGB transform.  The hue
/// wraps, so any real value is accepted.
pub fn hls_to_rgb(hue: f64, lightness: f64, saturation: f64) -> Rgb {
    if saturation == 0.0 {
        return Rgb(lightness, lightness, lightness);
    }
    let m2 = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let m1 = 2.0 * lightness - m2;
    Rgb(
        channel(m1, m2, hue + ONE_THIRD),
        channel(m1, m2, hue),
        channel(m1, m2, hue - ONE_THIRD),
    )
}

fn channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < ONE_SIXTH {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < TWO_THIRDS {
        m1 + (m2 - m1) * (TWO_THIRDS - hue) * 6.0
    } else {
        m1
    }
}

/// Turns solver results into pixels.
#[derive(Copy, Clone, Debug)]
pub struct ColorMapper {
    saturation: f64,
    sentinel: Rgb,
}

impl ColorMapper {
    /// A mapper with the given saturation, which must lie in [0, 1].
    /// Failed points are painted black.
    pub fn new(saturation: f64) -> Result<ColorMapper, FractalError> {
        if !(saturation >= 0.0 && saturation <= 1.0) {
            return Err(FractalError::config(format!(
                "saturation must lie in [0, 1], not {}",
                saturation
            )));
        }
        Ok(ColorMapper {
            saturation,
            sentinel: Rgb::BLACK,
        })
    }

    /// Paint failed points with `sentinel` instead of black.
    pub fn with_sentinel(self, sentinel: Rgb) -> Result<ColorMapper, FractalError> {
        if !sentinel.is_valid() {
            return Err(FractalError::config(format!(
                "sentinel color {:?} has a channel outside [0, 1]",
                sentinel
            )));
        }
        Ok(ColorMapper { sentinel, ..self })
    }

    /// The saturation used for every converged point.
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// The color for points that did not converge.
    pub fn sentinel(&self) -> Rgb {
        self.sentinel
    }

    /// The color for a point that reached `root` in `iterations` steps.
    pub fn root_color(&self, root: Complex<f64>, iterations: usize) -> Rgb {
        hls_to_rgb(hue(root), lightness(iterations), self.saturation)
    }

    /// The color for any solver result.
    pub fn color(&self, result: &IterationResult) -> Rgb {
        match *result {
            IterationResult::Converged {
                root, iterations, ..
            } => self.root_color(root, iterations),
            _ => self.sentinel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12 && (a.2 - b.2).abs() < 1e-12
    }

    #[test]
    fn lightness_starts_at_half_and_falls() {
        assert_eq!(lightness(0), 0.5);
        let mut previous = lightness(0);
        for n in 1..2000 {
            let l = lightness(n);
            assert!(l < previous && l > 0.0);
            previous = l;
        }
        assert!(lightness(1_000_000_000) < 1e-8);
    }

    #[test]
    fn hue_is_always_in_the_unit_interval() {
        let samples = [
            Complex::new(1.0, 0.0),
            Complex::new(-1.0, 0.0),
            Complex::new(-1.0, -0.0),
            Complex::new(0.0, -1.0),
            Complex::new(-0.5, -0.866),
            Complex::new(1.0, -1e-300),
            Complex::new(0.0, 0.0),
        ];
        for z in samples.iter() {
            let h = hue(*z);
            assert!(h >= 0.0 && h < 1.0, "hue({}) = {}", z, h);
        }
        assert!((hue(Complex::new(0.0, -1.0)) - 0.75).abs() < 1e-15);
        assert!((hue(Complex::new(0.0, 1.0)) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn wrapped_and_normalized_hues_agree() {
        for &raw in &[-0.4, -0.25, -0.1] {
            assert!(close(
                hls_to_rgb(raw, 0.3, 0.75),
                hls_to_rgb(raw + 1.0, 0.3, 0.75)
            ));
        }
    }

    #[test]
    fn primary_hues() {
        assert!(close(hls_to_rgb(0.0, 0.5, 1.0), Rgb(1.0, 0.0, 0.0)));
        assert!(close(hls_to_rgb(ONE_THIRD, 0.5, 1.0), Rgb(0.0, 1.0, 0.0)));
        assert!(close(hls_to_rgb(TWO_THIRDS, 0.5, 1.0), Rgb(0.0, 0.0, 1.0)));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert_eq!(hls_to_rgb(0.3, 0.4, 0.0), Rgb(0.4, 0.4, 0.4));
    }

    #[test]
    fn root_colors_stay_in_range() {
        let mapper = ColorMapper::new(0.75).unwrap();
        for k in 0..16 {
            let angle = k as f64 * PI / 8.0 - PI;
            let root = Complex::from_polar(&1.0, &angle);
            for n in &[0, 1, 5, 100] {
                assert!(mapper.root_color(root, *n).is_valid());
            }
        }
    }

    #[test]
    fn failures_get_the_sentinel() {
        let mapper = ColorMapper::new(0.75)
            .unwrap()
            .with_sentinel(Rgb(1.0, 1.0, 1.0))
            .unwrap();
        let stuck = IterationResult::NotConverged {
            start: Complex::new(0.0, 0.0),
            iterations: 10,
        };
        let singular = IterationResult::Singular {
            start: Complex::new(0.0, 0.0),
            at: Complex::new(0.0, 0.0),
            iteration: 0,
        };
        assert_eq!(mapper.color(&stuck), Rgb(1.0, 1.0, 1.0));
        assert_eq!(mapper.color(&singular), Rgb(1.0, 1.0, 1.0));
        assert_eq!(ColorMapper::new(0.75).unwrap().color(&stuck), Rgb::BLACK);
    }

    #[test]
    fn rejects_out_of_range_settings() {
        assert!(ColorMapper::new(1.5).is_err());
        assert!(ColorMapper::new(std::f64::NAN).is_err());
        assert!(ColorMapper::new(0.5)
            .unwrap()
            .with_sentinel(Rgb(0.0, 2.0, 0.0))
            .is_err());
    }
}
