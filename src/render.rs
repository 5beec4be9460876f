// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render pipeline: plane, escape times, palette, nightmare,
//! filter, inversion and compositing, strictly in that order.  Each
//! stage consumes the previous stage's raster and hands a new one on;
//! any stage failing aborts the render with no partial output.

use std::sync::OnceLock;
use std::time::Instant;

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animate::{frame_zoom, preflight, AnimationFrameSequence};
use crate::bands::default_threads;
use crate::compose::{composite, Layers};
use crate::error::{RenderError, Result};
use crate::escape::{EscapeRenderer, FractalSpec};
use crate::filters::{self, FilterKind};
use crate::flight::Ticket;
use crate::nightmare::nightmare;
use crate::palette::Palette;
use crate::planes::{PlaneMapper, ViewWindow};
use crate::settings::RenderSettings;
use crate::swirl::{detect_strategy, swirl_strength, SwirlStrategy};

/// Runs render requests.  Holds no per-request state: the worker count
/// and the swirl strategy picked when it was created.
pub struct Renderer {
    threads: usize,
    swirl: Box<dyn SwirlStrategy>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

impl Renderer {
    /// One worker per CPU and the best swirl this build supports.
    pub fn new() -> Self {
        Renderer {
            threads: default_threads(),
            swirl: detect_strategy(),
        }
    }

    /// Same renderer with a different worker count.
    pub fn with_threads(self, threads: usize) -> Self {
        Renderer {
            threads: threads.max(1),
            ..self
        }
    }

    /// Same renderer with an explicit swirl strategy.
    pub fn with_swirl(self, swirl: Box<dyn SwirlStrategy>) -> Self {
        Renderer { swirl, ..self }
    }

    /// Worker count.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Name of the swirl strategy in use.
    pub fn swirl_backend(&self) -> &'static str {
        self.swirl.name()
    }

    /// Renders one RGBA image.
    pub fn render(&self, settings: &RenderSettings, layers: &Layers) -> Result<RgbaImage> {
        self.run(settings, layers, settings.seed, &|| false)
    }

    /// Renders one image on behalf of `ticket`, giving up with
    /// `Superseded` as soon as a newer ticket is issued for the same slot.
    pub fn render_ticketed(
        &self,
        settings: &RenderSettings,
        layers: &Layers,
        ticket: &Ticket,
    ) -> Result<RgbaImage> {
        self.run(settings, layers, settings.seed, &|| !ticket.is_current())
    }

    /// Renders `settings.frames` frames along the zoom ramp.  Every
    /// frame is a full render; the caller's settings are not touched.
    /// Large animations log a warning first but still run.
    pub fn render_sequence(
        &self,
        settings: &RenderSettings,
        layers: &Layers,
    ) -> Result<AnimationFrameSequence> {
        settings.view.validate()?;
        if let Some(warning) = preflight(&settings.view, settings.frames) {
            warn!("{}", warning);
        }

        let mut frames = Vec::with_capacity(settings.frames);
        let mut zooms = Vec::with_capacity(settings.frames);
        let mut frame = settings.clone();
        for index in 0..settings.frames {
            let zoom = frame_zoom(settings.view.zoom, index, settings.zoom_step);
            frame.view = settings.view.with_zoom(zoom);
            let seed = settings.seed.map(|seed| seed.wrapping_add(index as u64));
            frames.push(self.run(&frame, layers, seed, &|| false)?);
            zooms.push(zoom);
            debug!("frame {}/{} at zoom {}", index + 1, settings.frames, zoom);
        }

        Ok(AnimationFrameSequence {
            frames,
            zooms,
            frame_delay: settings.frame_duration,
        })
    }

    fn run(
        &self,
        settings: &RenderSettings,
        layers: &Layers,
        seed: Option<u64>,
        cancelled: &(dyn Fn() -> bool + Sync),
    ) -> Result<RgbaImage> {
        let checkpoint = || {
            if cancelled() {
                Err(RenderError::Superseded)
            } else {
                Ok(())
            }
        };

        let started = Instant::now();
        let plane = PlaneMapper::new(&settings.view)?;
        let field = EscapeRenderer::new(plane, settings.spec).field_with(self.threads, cancelled)?;
        debug!(
            "escape: {}x{} {} at {} iterations in {:?}",
            field.width,
            field.height,
            settings.spec.family,
            settings.spec.max_iter,
            started.elapsed()
        );

        checkpoint()?;
        let mut image = settings.palette.colorize(&field, self.threads)?;
        drop(field);

        if settings.nightmare {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            image = nightmare(image, &mut rng, self.threads)?;
        }

        checkpoint()?;
        let filter_started = Instant::now();
        image = filters::apply(
            settings.filter,
            image,
            &*self.swirl,
            swirl_strength(settings.nightmare),
            self.threads,
        )?;
        if settings.filter != FilterKind::None {
            debug!("filter {} in {:?}", settings.filter, filter_started.elapsed());
        }
        if settings.invert {
            image = filters::invert(image);
        }

        checkpoint()?;
        let out = composite(&image, layers, settings.weave);
        debug!("render finished in {:?}", started.elapsed());
        Ok(out)
    }
}

// Backs the one-shot helpers, so the swirl backend is detected once
// per process rather than once per call.
fn shared() -> &'static Renderer {
    static SHARED: OnceLock<Renderer> = OnceLock::new();
    SHARED.get_or_init(Renderer::new)
}

/// One-shot render on the process-wide renderer.  The sketch, when
/// given, is woven over the fractal.
#[allow(clippy::too_many_arguments)]
pub fn render(
    view: ViewWindow,
    spec: FractalSpec,
    palette: &Palette,
    filter: FilterKind,
    nightmare: bool,
    invert: bool,
    background: Option<&RgbaImage>,
    sketch: Option<&RgbaImage>,
) -> Result<RgbaImage> {
    let settings = RenderSettings {
        view,
        spec,
        palette: palette.clone(),
        filter,
        nightmare,
        invert,
        weave: true,
        ..RenderSettings::default()
    };
    shared().render(&settings, &Layers { background, sketch })
}

/// One-shot animation on the process-wide renderer: `frame_count` frames,
/// frame `i` at `view.zoom * (1 + i * zoom_step)`.
#[allow(clippy::too_many_arguments)]
pub fn render_sequence(
    view: ViewWindow,
    spec: FractalSpec,
    palette: &Palette,
    filter: FilterKind,
    nightmare: bool,
    invert: bool,
    background: Option<&RgbaImage>,
    sketch: Option<&RgbaImage>,
    frame_count: usize,
    zoom_step: f64,
) -> Result<AnimationFrameSequence> {
    let settings = RenderSettings {
        view,
        spec,
        palette: palette.clone(),
        filter,
        nightmare,
        invert,
        weave: true,
        frames: frame_count,
        zoom_step,
        ..RenderSettings::default()
    };
    shared().render_sequence(&settings, &Layers { background, sketch })
}
