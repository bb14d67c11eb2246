// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The finished picture: one color per grid sample, laid out in the
//! grid's row-major order.

use image::{ImageBuffer, RgbImage};
use std::io;
use std::path::Path;

use colors::Rgb;
use errors::FractalError;

/// A square image of RGB triples.  Row 0 is the first imaginary
/// sample, column 0 the first real one.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    resolution: usize,
    pixels: Vec<Rgb>,
}

impl Image {
    /// Wrap a row-major pixel buffer, which must hold exactly
    /// `resolution * resolution` colors.
    pub fn new(resolution: usize, pixels: Vec<Rgb>) -> Result<Image, FractalError> {
        let needed = resolution.checked_mul(resolution);
        if resolution == 0 || needed != Some(pixels.len()) {
            return Err(FractalError::config(format!(
                "a {0}x{0} image cannot hold {1} pixels",
                resolution,
                pixels.len()
            )));
        }
        Ok(Image { resolution, pixels })
    }

    /// Width and height.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Every pixel, row-major.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// The pixel at a row and column, if it is inside the image.
    pub fn get(&self, row: usize, column: usize) -> Option<Rgb> {
        if row >= self.resolution || column >= self.resolution {
            return None;
        }
        Some(self.pixels[row * self.resolution + column])
    }

    /// The pixels one row at a time.
    pub fn rows(&self) -> ::std::slice::Chunks<Rgb> {
        self.pixels.chunks(self.resolution)
    }

    /// Every row with its channels scaled to 0..=255.
    pub fn to_rgb8(&self) -> Vec<Vec<[u8; 3]>> {
        self.rows()
            .map(|row| row.iter().map(|&color| to_bytes(color)).collect())
            .collect()
    }

    /// Convert to an `image` buffer for encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let size = self.resolution as u32;
        ImageBuffer::from_fn(size, size, |x, y| {
            ::image::Rgb(to_bytes(self.pixels[y as usize * self.resolution + x as usize]))
        })
    }

    /// Encode to `path`, in whatever format its extension names.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.to_rgb_image().save(path)
    }
}

fn to_bytes(color: Rgb) -> [u8; 3] {
    let scale = |c: f64| (c.max(0.0).min(1.0) * 255.0).round() as u8;
    [scale(color.0), scale(color.1), scale(color.2)]
}
