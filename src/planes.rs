// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the ViewWindow, which describes what part of the complex
//! plane the caller wants to look at, and the PlaneMapper, which
//! describes a relationship between a rectangle on the integral plane
//! with an origin at 0,0 in the upper-left corner, and the rectangle
//! on the complex plane that the ViewWindow selects.
use num::Complex;

use crate::error::{RenderError, Result};

/// Width of the complex rectangle visible at zoom 1.
const BASE_RANGE: f64 = 5.0;

/// Zoom factor applied per mouse-wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.2;

/// Zoom limits for interactive wheel zooming.
pub const WHEEL_ZOOM_LIMITS: (f64, f64) = (0.1, 10_000.0);

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the left-lower corner and right-upper corner of the
/// complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Describes the column, row of a pixel in a raster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The visible window: a raster size plus the zoom and center that
/// pick a rectangle out of the complex plane.  At zoom 1 the window is
/// five units wide; the height follows the raster's aspect ratio.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewWindow {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Magnification; must be finite and positive.
    pub zoom: f64,
    /// Real part of the window's center.
    pub center_x: f64,
    /// Imaginary part of the window's center.
    pub center_y: f64,
}

impl ViewWindow {
    /// A window of the given size centered on (center_x, center_y).
    pub fn new(width: u32, height: u32, zoom: f64, center_x: f64, center_y: f64) -> Self {
        ViewWindow {
            width,
            height,
            zoom,
            center_x,
            center_y,
        }
    }

    /// Rejects windows that cannot be rendered.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(RenderError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    /// Horizontal extent of the window on the complex plane.
    pub fn x_range(&self) -> f64 {
        BASE_RANGE / self.zoom
    }

    /// Vertical extent; keeps the complex rectangle at the raster's aspect ratio.
    pub fn y_range(&self) -> f64 {
        self.x_range() * f64::from(self.height) / f64::from(self.width.max(1))
    }

    /// The left-lower and right-upper corners of the visible rectangle.
    pub fn complex_plane(&self) -> ComplexPlane {
        let (half_x, half_y) = (self.x_range() / 2.0, self.y_range() / 2.0);
        ComplexPlane(
            Complex::new(self.center_x - half_x, self.center_y - half_y),
            Complex::new(self.center_x + half_x, self.center_y + half_y),
        )
    }

    /// The same window at another magnification.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        ViewWindow { zoom, ..*self }
    }

    /// Total number of pixels in the raster.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Moves the center to follow a drag of (dx, dy) pixels on a display
    /// of the given size.  Dragging down moves the content down, which
    /// means the center moves up the imaginary axis.
    pub fn pan(&mut self, dx: f64, dy: f64, display_width: u32, display_height: u32) {
        let display_width = f64::from(display_width.max(1));
        let display_height = f64::from(display_height.max(1));
        self.center_x -= dx * (self.x_range() / display_width);
        self.center_y += dy * (self.y_range() / display_height);
    }

    /// One wheel notch: positive deltas zoom in, anything else zooms out.
    pub fn zoom_by_wheel(&mut self, delta: i32) {
        let zoom = if delta > 0 {
            self.zoom * WHEEL_ZOOM_FACTOR
        } else {
            self.zoom / WHEEL_ZOOM_FACTOR
        };
        self.zoom = zoom.max(WHEEL_ZOOM_LIMITS.0).min(WHEEL_ZOOM_LIMITS.1);
    }
}

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex, real cartesian plane.  Maps points from one to the
/// other.  Pixel rows run downward while the imaginary axis runs
/// upward, so row 0 is the top edge of the complex rectangle.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
    // Complex distance between neighbouring pixels, horizontally and
    // vertically.  The first and last pixel of each axis sit exactly on
    // the rectangle's edges.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Builds the mapper for a view.  The view is validated first; a
    /// single-pixel axis is treated as having one step so that it maps
    /// to the rectangle's starting edge instead of dividing by zero.
    pub fn new(view: &ViewWindow) -> Result<PlaneMapper> {
        view.validate()?;
        let complex_plane = view.complex_plane();
        let (width, height) = (view.width as usize, view.height as usize);
        let steps = (
            (complex_plane.1.re - complex_plane.0.re) / (width.max(2) - 1) as f64,
            (complex_plane.1.im - complex_plane.0.im) / (height.max(2) - 1) as f64,
        );
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane,
            steps,
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// The real coordinate of a raster column.
    #[inline]
    pub fn column_to_re(&self, column: usize) -> f64 {
        self.complex_plane.0.re + (column as f64) * self.steps.0
    }

    /// The imaginary coordinate of a raster row.
    #[inline]
    pub fn row_to_im(&self, row: usize) -> f64 {
        self.complex_plane.1.im - (row as f64) * self.steps.1
    }

    /// Given a pixel on the integral cartesian plane, map that as
    /// closely as possible to a point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, map that to the nearest pixel.  Points
    /// outside the visible rectangle have no pixel.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = ((point.re - self.complex_plane.0.re) / self.steps.0).round();
        let top = ((self.complex_plane.1.im - point.im) / self.steps.1).round();
        if left < 0.0
            || top < 0.0
            || left >= self.integral_plane.0 as f64
            || top >= self.integral_plane.1 as f64
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn planemapper_fails_on_empty_raster() {
        let pm = PlaneMapper::new(&ViewWindow::new(0, 4, 1.0, 0.0, 0.0));
        match pm {
            Err(RenderError::InvalidDimensions { width, height }) => {
                assert_eq!((width, height), (0, 4))
            }
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }

    #[test]
    fn planemapper_fails_on_bad_zoom() {
        assert!(PlaneMapper::new(&ViewWindow::new(4, 4, 0.0, 0.0, 0.0)).is_err());
        assert!(PlaneMapper::new(&ViewWindow::new(4, 4, -2.0, 0.0, 0.0)).is_err());
        assert!(PlaneMapper::new(&ViewWindow::new(4, 4, std::f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn ranges_follow_zoom_and_aspect() {
        let view = ViewWindow::new(800, 600, 2.0, 0.0, 0.0);
        assert_eq!(view.x_range(), 2.5);
        assert_eq!(view.y_range(), 2.5 * 600.0 / 800.0);
        let ComplexPlane(ll, ru) = view.complex_plane();
        assert!(close(ll, Complex::new(-1.25, -0.9375)));
        assert!(close(ru, Complex::new(1.25, 0.9375)));
    }

    #[test]
    fn corners_map_to_the_rectangle_edges() {
        let pm = PlaneMapper::new(&ViewWindow::new(5, 5, 1.0, 0.0, 0.0)).unwrap();
        assert!(close(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.5, 2.5)));
        assert!(close(pm.pixel_to_point(&Pixel(4, 4)), Complex::new(2.5, -2.5)));
        assert!(close(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0)));
    }

    #[test]
    fn rows_run_down_the_imaginary_axis() {
        let pm = PlaneMapper::new(&ViewWindow::new(10, 10, 1.0, 0.5, -0.5)).unwrap();
        let top = pm.pixel_to_point(&Pixel(3, 0));
        let below = pm.pixel_to_point(&Pixel(3, 1));
        assert!(below.im < top.im);
        assert_eq!(below.re, top.re);
    }

    #[test]
    fn single_pixel_axes_do_not_divide_by_zero() {
        let pm = PlaneMapper::new(&ViewWindow::new(1, 1, 1.0, 0.0, 0.0)).unwrap();
        let p = pm.pixel_to_point(&Pixel(0, 0));
        assert!(p.re.is_finite() && p.im.is_finite());
        assert_eq!(pm.len(), 1);
        assert!(!pm.is_empty());
    }

    #[test]
    fn point_to_pixel_inverts_pixel_to_point() {
        let pm = PlaneMapper::new(&ViewWindow::new(64, 48, 3.0, -0.75, 0.1)).unwrap();
        for &pixel in &[Pixel(0, 0), Pixel(63, 47), Pixel(17, 30)] {
            let point = pm.pixel_to_point(&pixel);
            assert_eq!(pm.point_to_pixel(&point), Some(pixel));
        }
        assert_eq!(pm.point_to_pixel(&Complex::new(100.0, 0.0)), None);
    }

    #[test]
    fn panning_follows_the_drag() {
        let mut view = ViewWindow::new(800, 600, 1.0, 0.0, 0.0);
        view.pan(80.0, 60.0, 800, 600);
        assert!((view.center_x - -0.5).abs() < 1e-12);
        assert!((view.center_y - 0.375).abs() < 1e-12);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut view = ViewWindow::new(8, 8, 1.0, 0.0, 0.0);
        view.zoom_by_wheel(1);
        assert!((view.zoom - 1.2).abs() < 1e-12);
        view.zoom = 0.11;
        view.zoom_by_wheel(-1);
        assert_eq!(view.zoom, 0.1);
        view.zoom = 9_999.0;
        view.zoom_by_wheel(3);
        assert_eq!(view.zoom, 10_000.0);
    }
}
