// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The post-filter stage.  Every filter maps a raster to a raster of
//! the same size; alpha, when present, passes through untouched.

use std::fmt;
use std::str::FromStr;

use image::{imageops, ImageBuffer, Pixel};
use itertools::iproduct;

use crate::bands::for_each_row;
use crate::error::{RenderError, Result};
use crate::swirl::SwirlStrategy;

/// Any 8-bit raster.
pub type Raster<P> = ImageBuffer<P, Vec<u8>>;

/// Standard deviation of the Gaussian blur, in pixels.
pub const BLUR_SIGMA: f32 = 5.0;

/// The selectable post-filters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Leave the image as it is.
    None,
    /// Gaussian blur.
    Blur,
    /// Edge detection.
    Edge,
    /// `255 - channel`.
    Invert,
    /// Angular warp strongest at the center.
    Swirl,
    /// Relief effect around mid-grey.
    Emboss,
    /// Unsharp kernel.
    Sharpen,
    /// Dark outlines on white.
    Contour,
}

impl FilterKind {
    /// All filters, in menu order.
    pub fn all() -> &'static [FilterKind] {
        &[
            FilterKind::None,
            FilterKind::Blur,
            FilterKind::Edge,
            FilterKind::Invert,
            FilterKind::Swirl,
            FilterKind::Emboss,
            FilterKind::Sharpen,
            FilterKind::Contour,
        ]
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for FilterKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        FilterKind::all()
            .iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(key))
            .cloned()
            .ok_or_else(|| RenderError::InvalidFilter(s.to_string()))
    }
}

/// A 3x3 kernel with its divisor and the offset added afterwards.
#[derive(Copy, Clone, Debug)]
pub struct Kernel {
    /// Row-major weights.
    pub weights: [i32; 9],
    /// The weighted sum is divided by this.
    pub scale: i32,
    /// Added after scaling.
    pub offset: i32,
}

/// Laplacian edge finder.
pub const EDGE: Kernel = Kernel {
    weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
    scale: 1,
    offset: 0,
};

/// Diagonal relief around mid-grey.
pub const EMBOSS: Kernel = Kernel {
    weights: [-1, 0, 0, 0, 1, 0, 0, 0, 0],
    scale: 1,
    offset: 128,
};

/// Center-weighted sharpening.
pub const SHARPEN: Kernel = Kernel {
    weights: [-2, -2, -2, -2, 32, -2, -2, -2, -2],
    scale: 16,
    offset: 0,
};

/// Inverted edge finder.
pub const CONTOUR: Kernel = Kernel {
    weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
    scale: 1,
    offset: 255,
};

// Alpha is the last channel of two- and four-channel layouts.
fn color_channels<P: Pixel>() -> usize {
    match P::CHANNEL_COUNT {
        2 | 4 => P::CHANNEL_COUNT as usize - 1,
        n => n as usize,
    }
}

fn rebuild<P>(width: u32, height: u32, raw: Vec<u8>) -> Result<Raster<P>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    ImageBuffer::from_raw(width, height, raw).ok_or(RenderError::BufferMismatch(width, height))
}

/// Convolves the colour channels with a 3x3 kernel.  Neighbours past
/// the border are read from the nearest edge pixel.
pub fn convolve<P>(image: &Raster<P>, kernel: &Kernel, threads: usize) -> Result<Raster<P>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = image.dimensions();
    let channels = P::CHANNEL_COUNT as usize;
    let colors = color_channels::<P>();
    let stride = width as usize * channels;
    let source = image.as_raw();
    let (max_x, max_y) = (i64::from(width) - 1, i64::from(height) - 1);

    let mut raw = source.clone();
    for_each_row(&mut raw, stride, threads, |y, row| {
        for x in 0..width as usize {
            for c in 0..colors {
                let mut sum = 0i32;
                for (ky, kx) in iproduct!(0..3i64, 0..3i64) {
                    let sy = (y as i64 + ky - 1).max(0).min(max_y) as usize;
                    let sx = (x as i64 + kx - 1).max(0).min(max_x) as usize;
                    let weight = kernel.weights[(ky * 3 + kx) as usize];
                    sum += weight * i32::from(source[sy * stride + sx * channels + c]);
                }
                // sum / scale + offset, rounded half up
                let value = sum + kernel.offset * kernel.scale;
                let rounded = (2 * value + kernel.scale).div_euclid(2 * kernel.scale);
                row[x * channels + c] = rounded.max(0).min(255) as u8;
            }
        }
        Ok(())
    })?;
    rebuild(width, height, raw)
}

/// `255 - channel` on the colour channels.
pub fn invert<P>(mut image: Raster<P>) -> Raster<P>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let colors = color_channels::<P>();
    for pixel in image.pixels_mut() {
        for channel in pixel.channels_mut().iter_mut().take(colors) {
            *channel = 255 - *channel;
        }
    }
    image
}

/// Separable Gaussian blur; alpha is restored from the input afterwards.
pub fn blur<P>(image: &Raster<P>) -> Raster<P>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let mut blurred = imageops::blur(image, BLUR_SIGMA);
    if color_channels::<P>() < P::CHANNEL_COUNT as usize {
        for (out, original) in blurred.pixels_mut().zip(image.pixels()) {
            let alpha = P::CHANNEL_COUNT as usize - 1;
            out.channels_mut()[alpha] = original.channels()[alpha];
        }
    }
    blurred
}

/// Applies one filter.  `swirl_strength` only matters for `Swirl`.
pub fn apply<P>(
    kind: FilterKind,
    image: Raster<P>,
    swirl: &dyn SwirlStrategy,
    swirl_strength: f64,
    threads: usize,
) -> Result<Raster<P>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image);
    }
    match kind {
        FilterKind::None => Ok(image),
        FilterKind::Blur => Ok(blur(&image)),
        FilterKind::Edge => convolve(&image, &EDGE, threads),
        FilterKind::Invert => Ok(invert(image)),
        FilterKind::Swirl => {
            let channels = P::CHANNEL_COUNT as usize;
            let raw = swirl.swirl(image.as_raw(), width, height, channels, swirl_strength, threads)?;
            rebuild(width, height, raw)
        }
        FilterKind::Emboss => convolve(&image, &EMBOSS, threads),
        FilterKind::Sharpen => convolve(&image, &SHARPEN, threads),
        FilterKind::Contour => convolve(&image, &CONTOUR, threads),
    }
}
