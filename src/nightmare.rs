// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! "Nightmare" mode: per-channel noise followed by a wavy angular
//! jitter around the image center.
//!
//! Both steps draw from the random source the caller hands in.  The
//! renderer seeds that source from entropy unless the caller pins a
//! seed, so by default every nightmare render looks different.

use image::RgbImage;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::bands::for_each_row;
use crate::error::{RenderError, Result};

/// Noise amplitude per channel: red, green, blue.
pub const NOISE_BOUNDS: [i16; 3] = [20, 15, 30];

const STRENGTH_RANGE: (f64, f64) = (0.1, 0.3);
const FREQUENCY_RANGE: (f64, f64) = (8.0, 20.0);

/// The angular wave applied to every pixel: the angle around the
/// center is offset by `strength * sin(r / (max(w, h) / frequency))`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Jitter {
    /// Peak angular offset in radians.
    pub strength: f64,
    /// Number of wave periods across the longer image side.
    pub frequency: f64,
}

impl Jitter {
    /// Draws strength and frequency once from their fixed ranges.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Jitter {
        let strength = Uniform::new_inclusive(STRENGTH_RANGE.0, STRENGTH_RANGE.1);
        let frequency = Uniform::new_inclusive(FREQUENCY_RANGE.0, FREQUENCY_RANGE.1);
        Jitter {
            strength: strength.sample(rng),
            frequency: frequency.sample(rng),
        }
    }

    /// Resamples `image` along the wave with nearest-neighbour lookup,
    /// clamping lookups to the image bounds.
    pub fn apply(&self, image: &RgbImage, threads: usize) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        let wavelength = f64::from(width.max(height)) / self.frequency;
        let (max_x, max_y) = (f64::from(width) - 1.0, f64::from(height) - 1.0);
        let source = image.as_raw();
        let stride = width as usize * 3;

        let mut raw = vec![0u8; source.len()];
        for_each_row(&mut raw, stride, threads, |y, row| {
            let dy = y as f64 - cy;
            for (x, pixel) in row.chunks_mut(3).enumerate() {
                let dx = x as f64 - cx;
                let r = dx.hypot(dy);
                let theta = dy.atan2(dx) + self.strength * (r / wavelength).sin();
                let sx = (cx + r * theta.cos()).round().max(0.0).min(max_x) as usize;
                let sy = (cy + r * theta.sin()).round().max(0.0).min(max_y) as usize;
                let offset = sy * stride + sx * 3;
                pixel.copy_from_slice(&source[offset..offset + 3]);
            }
            Ok(())
        })?;
        RgbImage::from_raw(width, height, raw).ok_or(RenderError::BufferMismatch(width, height))
    }
}

/// Adds independent uniform noise to every channel of every pixel,
/// clamped to the channel range.
pub fn add_noise<R: Rng + ?Sized>(mut image: RgbImage, rng: &mut R) -> RgbImage {
    let noise = [
        Uniform::new_inclusive(-NOISE_BOUNDS[0], NOISE_BOUNDS[0]),
        Uniform::new_inclusive(-NOISE_BOUNDS[1], NOISE_BOUNDS[1]),
        Uniform::new_inclusive(-NOISE_BOUNDS[2], NOISE_BOUNDS[2]),
    ];
    for pixel in image.pixels_mut() {
        for (channel, dist) in pixel.0.iter_mut().zip(noise.iter()) {
            let value = i16::from(*channel) + dist.sample(rng);
            *channel = value.max(0).min(255) as u8;
        }
    }
    image
}

/// The full nightmare pass: noise, then one freshly drawn jitter.
pub fn nightmare<R: Rng + ?Sized>(image: RgbImage, rng: &mut R, threads: usize) -> Result<RgbImage> {
    let noised = add_noise(image, rng);
    let jitter = Jitter::draw(rng);
    debug!(
        "nightmare jitter strength {:.3}, frequency {:.2}",
        jitter.strength, jitter.frequency
    );
    jitter.apply(&noised, threads)
}
