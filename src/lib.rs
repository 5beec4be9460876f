#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal weaver
//!
//! An escape-time fractal renderer.  A render maps a window of the
//! complex plane onto a pixel grid, counts for every pixel how many
//! iterations of the family's recurrence it takes the orbit to leave
//! the circle of radius two, and paints those counts through a colour
//! gradient.  The painted image can then be roughened ("nightmare"
//! mode), run through one of a handful of classic filters, inverted,
//! and woven together with a background picture and a transparent
//! sketch layer drawn by hand.
//!
//! The Mandelbrot, Julia, Burning Ship and Tricorn recurrences are
//! supported at any real power.  Zoom animations render the same view
//! at a growing zoom, one full render per frame.
//!
//! Every stage splits its raster into rows and hands the rows to a pool
//! of scoped worker threads, so a render scales with the cores it is
//! given.  Renders share no state; a caller that keeps firing requests
//! at the same target uses a `SingleFlight` slot so that stale renders
//! give up early and their results are dropped.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;
extern crate rand;

mod bands;

pub mod animate;
pub mod compose;
pub mod error;
pub mod escape;
pub mod export;
pub mod filters;
pub mod flight;
pub mod nightmare;
pub mod palette;
pub mod planes;
pub mod render;
pub mod settings;
pub mod swirl;

pub use animate::{preflight, AnimationFrameSequence, CostEstimate, CostWarning};
pub use bands::default_threads;
pub use compose::Layers;
pub use error::{RenderError, Result};
pub use escape::{escape_time, EscapeRenderer, FractalFamily, FractalSpec, IterationField};
pub use filters::FilterKind;
pub use flight::{SingleFlight, Ticket};
pub use palette::{Palette, PaletteName};
pub use planes::{Pixel, PlaneMapper, ViewWindow};
pub use render::{render, render_sequence, Renderer};
pub use settings::{Preset, RenderSettings};
pub use swirl::{detect_strategy, InterpolatedSwirl, NearestNeighborSwirl, SwirlStrategy};
