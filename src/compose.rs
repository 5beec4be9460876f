// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Layers the background, the fractal and the sketch into one RGBA
//! raster the size of the fractal.  Caller-owned layers are only ever
//! read; when a layer has the wrong size a resized copy is made.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbImage, RgbaImage};

/// The optional caller-owned layers of one render.
#[derive(Copy, Clone, Debug, Default)]
pub struct Layers<'a> {
    /// Drawn beneath the fractal.
    pub background: Option<&'a RgbaImage>,
    /// Hand-drawn overlay, pasted above the fractal with its own alpha.
    pub sketch: Option<&'a RgbaImage>,
}

impl<'a> Layers<'a> {
    /// No background, no sketch.
    pub fn none() -> Self {
        Layers::default()
    }
}

// A read-only view of the layer at the target size.
fn fitted(layer: &RgbaImage, width: u32, height: u32) -> Cow<RgbaImage> {
    if layer.dimensions() == (width, height) {
        Cow::Borrowed(layer)
    } else {
        Cow::Owned(imageops::resize(layer, width, height, FilterType::Lanczos3))
    }
}

#[inline]
fn mix(under: u8, over: u8, weight: u32) -> u8 {
    ((u32::from(over) * weight + u32::from(under) * (255 - weight) + 127) / 255) as u8
}

/// Porter-Duff "over": `top` composited onto `bottom`.
pub fn alpha_composite(bottom: &mut RgbaImage, top: &RgbaImage) {
    for (under, over) in bottom.pixels_mut().zip(top.pixels()) {
        let (sa, da) = (f64::from(over[3]) / 255.0, f64::from(under[3]) / 255.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            *under = Rgba([0, 0, 0, 0]);
            continue;
        }
        let mut out = [0u8; 4];
        for c in 0..3 {
            let value = (f64::from(over[c]) * sa + f64::from(under[c]) * da * (1.0 - sa)) / out_a;
            out[c] = value.round().max(0.0).min(255.0) as u8;
        }
        out[3] = (out_a * 255.0).round() as u8;
        *under = Rgba(out);
    }
}

/// Pastes `top` onto `bottom` using `top`'s alpha as the mask: colour
/// is mixed by the mask and coverage accumulates, so a fully
/// transparent pixel leaves `bottom` untouched and a fully opaque one
/// replaces it.
pub fn paste_masked(bottom: &mut RgbaImage, top: &RgbaImage) {
    for (under, over) in bottom.pixels_mut().zip(top.pixels()) {
        let weight = u32::from(over[3]);
        for c in 0..3 {
            under[c] = mix(under[c], over[c], weight);
        }
        under[3] = (weight + (u32::from(under[3]) * (255 - weight) + 127) / 255) as u8;
    }
}

/// Builds the final raster: a transparent canvas, the background
/// (resized to fit) composited onto it, the opaque fractal over that,
/// and finally the sketch pasted through its own alpha when weaving.
pub fn composite(fractal: &RgbImage, layers: &Layers, weave: bool) -> RgbaImage {
    let (width, height) = fractal.dimensions();
    let mut canvas = RgbaImage::new(width, height);

    if let Some(background) = layers.background {
        alpha_composite(&mut canvas, &fitted(background, width, height));
    }

    let opaque = RgbaImage::from_fn(width, height, |x, y| {
        let p = fractal.get_pixel(x, y);
        Rgba([p[0], p[1], p[2], 255])
    });
    alpha_composite(&mut canvas, &opaque);

    if weave {
        if let Some(sketch) = layers.sketch {
            paste_masked(&mut canvas, &fitted(sketch, width, height));
        }
    }
    canvas
}
