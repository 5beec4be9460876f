// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The swirl warp, in two qualities.
//!
//! Both strategies share one geometry: every output pixel reads from
//! the point obtained by rotating it about the image center by
//! `strength * exp(-r / (width / 5))`, so the twist is strongest at the
//! center and fades outward.  They differ only in how that point is
//! sampled.  `InterpolatedSwirl` hands the point to the image crate's
//! bilinear sampler and is offered only when the crate is built with
//! the `interpolation` feature; `NearestNeighborSwirl` is always
//! available, rounds to the nearest pixel, and shrinks very large
//! images before warping.

use image::imageops::{self, interpolate_bilinear, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

use crate::bands::for_each_row;
use crate::error::{RenderError, Result};

/// Images above this many pixels are warped at reduced size by the
/// nearest-neighbour strategy.
pub const SWIRL_PIXEL_BUDGET: u64 = 2_000_000;

/// Twist at the center, in radians.
pub fn swirl_strength(nightmare: bool) -> f64 {
    if nightmare {
        2.0
    } else {
        1.0
    }
}

/// The source point that output pixel `(x, y)` reads from.
#[inline]
pub fn warp_source(x: f64, y: f64, width: u32, height: u32, strength: f64) -> (f64, f64) {
    let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let (dx, dy) = (x - cx, y - cy);
    let r = dx.hypot(dy);
    let theta = dy.atan2(dx) + strength * (-r / (f64::from(width) / 5.0)).exp();
    (cx + r * theta.cos(), cy + r * theta.sin())
}

/// A way of resampling an image along the swirl.  Buffers are raw,
/// row-major, `channels` bytes per pixel; the result has the same
/// layout and size.
pub trait SwirlStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Warps `source` and returns the new pixels.
    fn swirl(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        channels: usize,
        strength: f64,
        threads: usize,
    ) -> Result<Vec<u8>>;
}

// Runs the shared geometry over every output pixel, delegating the
// lookup of the warped point to `sample`.
fn warp<S>(
    source: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    strength: f64,
    threads: usize,
    sample: S,
) -> Result<Vec<u8>>
where
    S: Fn(f64, f64, &mut [u8]) + Sync,
{
    let expected = width as usize * height as usize * channels;
    if source.len() != expected {
        return Err(RenderError::BufferMismatch(width, height));
    }
    let mut raw = vec![0u8; expected];
    for_each_row(&mut raw, width as usize * channels, threads, |y, row| {
        for (x, pixel) in row.chunks_mut(channels).enumerate() {
            let (sx, sy) = warp_source(x as f64, y as f64, width, height, strength);
            sample(sx, sy, pixel);
        }
        Ok(())
    })?;
    Ok(raw)
}

/// Bilinear resampling through `imageops::interpolate_bilinear`;
/// points outside the image are pulled onto the nearest edge first.
#[derive(Debug)]
pub struct InterpolatedSwirl {
    _sealed: (),
}

impl InterpolatedSwirl {
    /// Succeeds only when the `interpolation` feature is compiled in.
    pub fn probe() -> Result<InterpolatedSwirl> {
        if cfg!(feature = "interpolation") {
            Ok(InterpolatedSwirl { _sealed: () })
        } else {
            Err(RenderError::UnsupportedFilterBackend(
                "bilinear swirl needs the `interpolation` feature",
            ))
        }
    }
}

impl SwirlStrategy for InterpolatedSwirl {
    fn name(&self) -> &'static str {
        "bilinear"
    }

    fn swirl(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        channels: usize,
        strength: f64,
        threads: usize,
    ) -> Result<Vec<u8>> {
        match channels {
            1 => bilinear::<Luma<u8>>(source, width, height, strength, threads),
            2 => bilinear::<LumaA<u8>>(source, width, height, strength, threads),
            3 => bilinear::<Rgb<u8>>(source, width, height, strength, threads),
            4 => bilinear::<Rgba<u8>>(source, width, height, strength, threads),
            _ => Err(RenderError::BufferMismatch(width, height)),
        }
    }
}

fn bilinear<P>(source: &[u8], width: u32, height: u32, strength: f64, threads: usize) -> Result<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Sync + 'static,
{
    let channels = P::CHANNEL_COUNT as usize;
    let image: ImageBuffer<P, &[u8]> = ImageBuffer::from_raw(width, height, source)
        .ok_or(RenderError::BufferMismatch(width, height))?;
    let (max_x, max_y) = (f64::from(width) - 1.0, f64::from(height) - 1.0);
    let stride = width as usize * channels;
    warp(source, width, height, channels, strength, threads, |sx, sy, pixel| {
        let sx = sx.max(0.0).min(max_x);
        let sy = sy.max(0.0).min(max_y);
        match interpolate_bilinear(&image, sx as f32, sy as f32) {
            Some(sampled) => pixel.copy_from_slice(sampled.channels()),
            // f32 rounding can nudge a clamped edge coordinate outside.
            None => {
                let offset = sy.round() as usize * stride + sx.round() as usize * channels;
                pixel.copy_from_slice(&source[offset..offset + channels]);
            }
        }
    })
}

/// Nearest-neighbour resampling, with a size budget.
#[derive(Debug, Default)]
pub struct NearestNeighborSwirl;

impl SwirlStrategy for NearestNeighborSwirl {
    fn name(&self) -> &'static str {
        "nearest-neighbour"
    }

    fn swirl(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        channels: usize,
        strength: f64,
        threads: usize,
    ) -> Result<Vec<u8>> {
        let pixels = u64::from(width) * u64::from(height);
        if strength != 0.0 && pixels > SWIRL_PIXEL_BUDGET {
            let scale = (SWIRL_PIXEL_BUDGET as f64 / pixels as f64).sqrt();
            let small_width = ((f64::from(width) * scale) as u32).max(1);
            let small_height = ((f64::from(height) * scale) as u32).max(1);
            debug!(
                "swirl: {}x{} over budget, warping at {}x{}",
                width, height, small_width, small_height
            );
            let small = resize_raw(source, width, height, channels, small_width, small_height)?;
            let warped = self.swirl(&small, small_width, small_height, channels, strength, threads)?;
            return resize_raw(&warped, small_width, small_height, channels, width, height);
        }

        let (max_x, max_y) = (f64::from(width) - 1.0, f64::from(height) - 1.0);
        let stride = width as usize * channels;
        warp(source, width, height, channels, strength, threads, |sx, sy, pixel| {
            let x = sx.round().max(0.0).min(max_x) as usize;
            let y = sy.round().max(0.0).min(max_y) as usize;
            let offset = y * stride + x * channels;
            pixel.copy_from_slice(&source[offset..offset + channels]);
        })
    }
}

fn resize_raw(
    source: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    new_width: u32,
    new_height: u32,
) -> Result<Vec<u8>> {
    fn resize_as<P>(source: &[u8], width: u32, height: u32, new_width: u32, new_height: u32) -> Result<Vec<u8>>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        let image: ImageBuffer<P, Vec<u8>> = ImageBuffer::from_raw(width, height, source.to_vec())
            .ok_or(RenderError::BufferMismatch(width, height))?;
        Ok(imageops::resize(&image, new_width, new_height, FilterType::Triangle).into_raw())
    }

    match channels {
        1 => resize_as::<Luma<u8>>(source, width, height, new_width, new_height),
        2 => resize_as::<LumaA<u8>>(source, width, height, new_width, new_height),
        3 => resize_as::<Rgb<u8>>(source, width, height, new_width, new_height),
        4 => resize_as::<Rgba<u8>>(source, width, height, new_width, new_height),
        _ => Err(RenderError::BufferMismatch(width, height)),
    }
}

/// Picks the best strategy this build supports.  Called once, when a
/// renderer is created.
pub fn detect_strategy() -> Box<dyn SwirlStrategy> {
    match InterpolatedSwirl::probe() {
        Ok(strategy) => {
            info!("swirl backend: {}", strategy.name());
            Box::new(strategy)
        }
        Err(err) => {
            warn!("{}; swirl falls back to nearest-neighbour sampling", err);
            Box::new(NearestNeighborSwirl)
        }
    }
}
