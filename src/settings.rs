// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The full parameter set of a render request, with the defaults a
//! fresh session starts from, and the named presets.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use num::Complex;

use crate::error::{RenderError, Result};
use crate::escape::{FractalFamily, FractalSpec};
use crate::filters::FilterKind;
use crate::palette::{Palette, PaletteName};
use crate::planes::ViewWindow;

/// Display time of one animation frame unless told otherwise.
pub const DEFAULT_FRAME_DURATION_MS: u64 = 100;

/// Zoom growth per animation frame: frame `i` is shown at
/// `zoom * (1 + i * step)`.
pub const DEFAULT_ZOOM_STEP: f64 = 0.2;

/// Everything a caller chooses for one render or one animation.
/// Built fresh for each request; the pipeline never mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Raster size and the visible part of the plane.
    pub view: ViewWindow,
    /// The recurrence and its budget.
    pub spec: FractalSpec,
    /// Gradient for the iteration field.
    pub palette: Palette,
    /// Post-filter.
    pub filter: FilterKind,
    /// Noise and jitter after colouring; also doubles the swirl.
    pub nightmare: bool,
    /// Invert colours after filtering.
    pub invert: bool,
    /// Paste the sketch layer over the fractal.
    pub weave: bool,
    /// Pins the nightmare randomness; `None` draws fresh entropy.
    pub seed: Option<u64>,
    /// Number of animation frames.
    pub frames: usize,
    /// Display time of each animation frame.
    pub frame_duration: Duration,
    /// Zoom growth per animation frame.
    pub zoom_step: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            view: ViewWindow::new(800, 600, 1.0, 0.0, 0.0),
            spec: FractalSpec::new(FractalFamily::Mandelbrot, 256)
                .with_julia_c(Complex::new(-0.7, 0.27)),
            palette: PaletteName::Dream.palette(),
            filter: FilterKind::None,
            nightmare: false,
            invert: false,
            weave: true,
            seed: None,
            frames: 20,
            frame_duration: Duration::from_millis(DEFAULT_FRAME_DURATION_MS),
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

impl RenderSettings {
    /// Overwrites the parameters a preset pins, leaving the rest alone.
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Spiral => {
                self.spec.family = FractalFamily::Julia;
                self.spec.julia_c = Complex::new(-0.8, 0.156);
                self.view.zoom = 1.0;
                self.view.center_x = 0.0;
                self.view.center_y = 0.0;
            }
            Preset::Seahorse => {
                self.spec.family = FractalFamily::Mandelbrot;
                self.view.zoom = 100.0;
                self.view.center_x = -0.75;
                self.view.center_y = 0.1;
            }
        }
        self.spec.power = 2.0;
    }
}

/// Named starting points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preset {
    /// A spiralling Julia set, c = -0.8 + 0.156i.
    Spiral,
    /// Seahorse valley of the Mandelbrot set.
    Seahorse,
}

impl Preset {
    /// All presets.
    pub fn all() -> &'static [Preset] {
        &[Preset::Spiral, Preset::Seahorse]
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Preset {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        Preset::all()
            .iter()
            .find(|preset| preset.to_string().eq_ignore_ascii_case(key))
            .cloned()
            .ok_or_else(|| RenderError::InvalidPreset(s.to_string()))
    }
}
