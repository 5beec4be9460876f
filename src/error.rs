// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by every stage of the pipeline.  A
//! failure anywhere aborts the whole render; there is no partial image.

use image::ImageError;
use std::io;

/// Everything that can go wrong while rendering or exporting.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The requested raster has a zero side.
    #[fail(display = "invalid dimensions {}x{}: both sides must be positive", width, height)]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Zoom must be a finite, strictly positive number.
    #[fail(display = "invalid zoom {}: must be finite and greater than zero", _0)]
    InvalidZoom(f64),

    /// The exponent must be finite and at least 1.
    #[fail(display = "invalid power {}: must be finite and at least 1", _0)]
    InvalidPower(f64),

    /// The fractal family name is not one we know how to iterate.
    #[fail(display = "unrecognized fractal family: {:?}", _0)]
    InvalidFamily(String),

    /// Unknown palette name, or a stop table that breaks the gradient rules.
    #[fail(display = "invalid palette: {}", _0)]
    InvalidPalette(String),

    /// Unknown filter name.
    #[fail(display = "unrecognized filter: {:?}", _0)]
    InvalidFilter(String),

    /// Unknown preset name.
    #[fail(display = "unrecognized preset: {:?}", _0)]
    InvalidPreset(String),

    /// The interpolating swirl backend is not compiled in.  Only the
    /// capability probe produces this; rendering falls back instead.
    #[fail(display = "filter backend not available: {}", _0)]
    UnsupportedFilterBackend(&'static str),

    /// A newer request took over this render's slot.
    #[fail(display = "render superseded by a newer request")]
    Superseded,

    /// One of the row workers panicked.
    #[fail(display = "a render worker thread panicked")]
    WorkerPanicked,

    /// A raster buffer did not match its declared dimensions.
    #[fail(display = "raster buffer does not match {}x{}", _0, _1)]
    BufferMismatch(u32, u32),

    /// An animation export was handed no frames.
    #[fail(display = "cannot export an animation with no frames")]
    EmptyAnimation,

    /// Encoding or decoding an image file failed.
    #[fail(display = "image codec error: {}", _0)]
    Export(#[cause] ImageError),

    /// Reading or writing a file failed.
    #[fail(display = "i/o error: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<ImageError> for RenderError {
    fn from(err: ImageError) -> Self {
        RenderError::Export(err)
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        RenderError::Io(err)
    }
}

/// Shorthand used across the crate.
pub type Result<T> = std::result::Result<T, RenderError>;
