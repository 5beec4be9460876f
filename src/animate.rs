// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Zoom animations: the frame sequence type, the zoom ramp, and the
//! cost guard callers consult before committing to a long render.

use std::fmt;
use std::time::Duration;

use image::RgbaImage;

use crate::planes::ViewWindow;

/// Frame memory above which `preflight` warns.
pub const FRAME_MEMORY_WARNING_BYTES: u64 = 512 * 1024 * 1024;

/// Rendered frames in display order, ready for a GIF encoder.
#[derive(Clone, Debug)]
pub struct AnimationFrameSequence {
    /// One RGBA raster per frame.
    pub frames: Vec<RgbaImage>,
    /// The zoom each frame was rendered at.
    pub zooms: Vec<f64>,
    /// How long each frame stays on screen.
    pub frame_delay: Duration,
}

impl AnimationFrameSequence {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True for a zero-frame animation.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Zoom of frame `index` on a ramp starting at `initial`.
pub fn frame_zoom(initial: f64, index: usize, step: f64) -> f64 {
    initial * (1.0 + index as f64 * step)
}

/// What an animation will cost in pixels and frame memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CostEstimate {
    /// Number of frames.
    pub frames: usize,
    /// Pixels over all frames.
    pub pixels: u64,
    /// Bytes held by the finished RGBA frames.
    pub bytes: u64,
}

impl CostEstimate {
    /// Estimates `frames` renders of `view`.
    pub fn new(view: &ViewWindow, frames: usize) -> Self {
        let pixels = view.pixel_count().saturating_mul(frames as u64);
        CostEstimate {
            frames,
            pixels,
            bytes: pixels.saturating_mul(4),
        }
    }
}

/// A warning that an animation is unusually large.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CostWarning {
    /// The estimate that tripped the guard.
    pub estimate: CostEstimate,
    /// The threshold it exceeded.
    pub limit: u64,
}

impl fmt::Display for CostWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} frames totalling {} pixels need about {} MiB of frame memory (warning above {} MiB)",
            self.estimate.frames,
            self.estimate.pixels,
            self.estimate.bytes / (1024 * 1024),
            self.limit / (1024 * 1024)
        )
    }
}

/// Checks an animation before it is started.  Large animations are
/// allowed; the warning is for the caller to show or act on.
pub fn preflight(view: &ViewWindow, frames: usize) -> Option<CostWarning> {
    let estimate = CostEstimate::new(view, frames);
    if estimate.bytes > FRAME_MEMORY_WARNING_BYTES {
        Some(CostWarning {
            estimate,
            limit: FRAME_MEMORY_WARNING_BYTES,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_ramp_is_linear_in_the_frame_index() {
        assert_eq!(frame_zoom(2.0, 0, 0.2), 2.0);
        assert!((frame_zoom(2.0, 4, 0.2) - 3.6).abs() < 1e-12);
    }

    #[test]
    fn small_animations_pass_preflight() {
        let view = ViewWindow::new(800, 600, 1.0, 0.0, 0.0);
        assert_eq!(preflight(&view, 20), None);
        assert_eq!(CostEstimate::new(&view, 20).bytes, 800 * 600 * 20 * 4);
    }

    #[test]
    fn huge_animations_warn() {
        let view = ViewWindow::new(3840, 2160, 1.0, 0.0, 0.0);
        let warning = preflight(&view, 30).expect("4K x 30 should warn");
        assert_eq!(warning.estimate.frames, 30);
        assert!(warning.to_string().contains("30 frames"));
    }
}
