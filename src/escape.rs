// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time engine.
//!
//! Every pixel is mapped to a point on the complex plane and a
//! recurrence `z -> fold(z)^power + c` is iterated from it.  The number
//! of iterations it takes for `|z|` to exceed 2 is that pixel's
//! "velocity", and is what the palette later turns into a colour.
//! Pixels whose orbit never leaves the disc within the iteration
//! budget are interior points and keep the value `max_iter`.
//!
//! The four families differ only in how the orbit is seeded and in
//! the fold applied before the power step.  Each family is its own
//! zero-sized `Orbit` type, and the row loop is monomorphized over it,
//! so the family branch is taken once per render rather than once per
//! iteration.

use std::fmt;
use std::str::FromStr;

use num::Complex;

use crate::bands::for_each_row;
use crate::error::{RenderError, Result};
use crate::planes::{Pixel, PlaneMapper};

/// Orbits are considered escaped once `|z|^2` exceeds this.
const ESCAPE_NORM_SQR: f64 = 4.0;

/// Largest integral power that is expanded into repeated multiplication.
const MAX_UNROLLED_POWER: f64 = 16.0;

/// The closed set of escape-time families.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FractalFamily {
    /// `z0 = 0`, `c = pixel`.
    Mandelbrot,
    /// `z0 = pixel`, `c` fixed for the whole image.
    Julia,
    /// Mandelbrot with both components folded to their absolute value.
    BurningShip,
    /// Mandelbrot on the complex conjugate ("Mandelbar").
    Tricorn,
}

impl FractalFamily {
    /// All families, in menu order.
    pub fn all() -> &'static [FractalFamily] {
        &[
            FractalFamily::Mandelbrot,
            FractalFamily::Julia,
            FractalFamily::BurningShip,
            FractalFamily::Tricorn,
        ]
    }
}

impl fmt::Display for FractalFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FractalFamily::Mandelbrot => "Mandelbrot",
            FractalFamily::Julia => "Julia",
            FractalFamily::BurningShip => "Burning Ship",
            FractalFamily::Tricorn => "Tricorn",
        };
        f.write_str(name)
    }
}

impl FromStr for FractalFamily {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "mandelbrot" => Ok(FractalFamily::Mandelbrot),
            "julia" => Ok(FractalFamily::Julia),
            "burningship" => Ok(FractalFamily::BurningShip),
            "tricorn" => Ok(FractalFamily::Tricorn),
            _ => Err(RenderError::InvalidFamily(s.to_string())),
        }
    }
}

/// Everything the engine needs to know besides the view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FractalSpec {
    /// Which recurrence to iterate.
    pub family: FractalFamily,
    /// Exponent of the power step; may be fractional.
    pub power: f64,
    /// The constant `c` used by the Julia family; ignored otherwise.
    pub julia_c: Complex<f64>,
    /// Iteration budget per pixel.
    pub max_iter: u32,
}

impl FractalSpec {
    /// A classic quadratic set of the given family.
    pub fn new(family: FractalFamily, max_iter: u32) -> Self {
        FractalSpec {
            family,
            power: 2.0,
            julia_c: Complex::new(0.0, 0.0),
            max_iter,
        }
    }

    /// Same spec with another exponent.
    pub fn with_power(self, power: f64) -> Self {
        FractalSpec { power, ..self }
    }

    /// Same spec with another Julia constant.
    pub fn with_julia_c(self, julia_c: Complex<f64>) -> Self {
        FractalSpec { julia_c, ..self }
    }

    /// Rejects exponents below 1, where the escape radius of 2 no
    /// longer separates bounded orbits from divergent ones.
    pub fn validate(&self) -> Result<()> {
        if !self.power.is_finite() || self.power < 1.0 {
            return Err(RenderError::InvalidPower(self.power));
        }
        Ok(())
    }
}

/// Per-pixel escape iterations, row-major, `height` rows of `width`.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationField {
    /// Columns per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// The budget the field was computed with; the value of interior points.
    pub max_iter: u32,
    /// One entry per pixel, each in `0..=max_iter`.
    pub data: Vec<u32>,
}

impl IterationField {
    /// The escape iteration at a pixel.
    pub fn get(&self, pixel: &Pixel) -> u32 {
        self.data[pixel.1 * self.width + pixel.0]
    }

    /// The field as a flat row-major slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }
}

// The power step, resolved once per render.
#[derive(Copy, Clone, Debug)]
enum Exponent {
    Square,
    Integral(u32),
    Real(f64),
}

impl Exponent {
    fn new(power: f64) -> Self {
        if power == 2.0 {
            Exponent::Square
        } else if power >= 1.0 && power <= MAX_UNROLLED_POWER && power.fract() == 0.0 {
            Exponent::Integral(power as u32)
        } else {
            Exponent::Real(power)
        }
    }

    #[inline]
    fn apply(self, z: Complex<f64>) -> Complex<f64> {
        match self {
            Exponent::Square => z * z,
            Exponent::Integral(n) => {
                let mut acc = z;
                for _ in 1..n {
                    acc = acc * z;
                }
                acc
            }
            Exponent::Real(p) => {
                if z.re == 0.0 && z.im == 0.0 {
                    z
                } else {
                    z.powf(p)
                }
            }
        }
    }
}

/// How a family seeds its orbit and folds `z` before each power step.
trait Orbit {
    fn seed(point: Complex<f64>, julia_c: Complex<f64>) -> (Complex<f64>, Complex<f64>);

    #[inline]
    fn fold(z: Complex<f64>) -> Complex<f64> {
        z
    }
}

struct MandelbrotOrbit;
struct JuliaOrbit;
struct BurningShipOrbit;
struct TricornOrbit;

impl Orbit for MandelbrotOrbit {
    #[inline]
    fn seed(point: Complex<f64>, _: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (Complex::new(0.0, 0.0), point)
    }
}

impl Orbit for JuliaOrbit {
    #[inline]
    fn seed(point: Complex<f64>, julia_c: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (point, julia_c)
    }
}

impl Orbit for BurningShipOrbit {
    #[inline]
    fn seed(point: Complex<f64>, _: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (Complex::new(0.0, 0.0), point)
    }

    #[inline]
    fn fold(z: Complex<f64>) -> Complex<f64> {
        Complex::new(z.re.abs(), z.im.abs())
    }
}

impl Orbit for TricornOrbit {
    #[inline]
    fn seed(point: Complex<f64>, _: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (Complex::new(0.0, 0.0), point)
    }

    #[inline]
    fn fold(z: Complex<f64>) -> Complex<f64> {
        z.conj()
    }
}

/// This is our classic iterator function: the iteration on which the
/// orbit first left the disc of radius 2, or `max_iter` if it never
/// did.  An escaped orbit stops iterating immediately, so diverged
/// values are never raised to further powers.
#[inline]
fn iterate<O: Orbit>(
    point: Complex<f64>,
    julia_c: Complex<f64>,
    exponent: Exponent,
    max_iter: u32,
) -> u32 {
    let (mut z, c) = O::seed(point, julia_c);
    for i in 0..max_iter {
        z = exponent.apply(O::fold(z)) + c;
        // A NaN can only come from a non-finite seed; treat it as escaped.
        if !(z.norm_sqr() <= ESCAPE_NORM_SQR) {
            return i;
        }
    }
    max_iter
}

fn fill_row<O: Orbit>(plane: &PlaneMapper, spec: &FractalSpec, y: usize, row: &mut [u32]) {
    let exponent = Exponent::new(spec.power);
    let im = plane.row_to_im(y);
    for (x, cell) in row.iter_mut().enumerate() {
        let point = Complex::new(plane.column_to_re(x), im);
        *cell = iterate::<O>(point, spec.julia_c, exponent, spec.max_iter);
    }
}

/// The escape iteration of a single point on the complex plane.
pub fn escape_time(spec: &FractalSpec, point: Complex<f64>) -> u32 {
    let exponent = Exponent::new(spec.power);
    match spec.family {
        FractalFamily::Mandelbrot => {
            iterate::<MandelbrotOrbit>(point, spec.julia_c, exponent, spec.max_iter)
        }
        FractalFamily::Julia => iterate::<JuliaOrbit>(point, spec.julia_c, exponent, spec.max_iter),
        FractalFamily::BurningShip => {
            iterate::<BurningShipOrbit>(point, spec.julia_c, exponent, spec.max_iter)
        }
        FractalFamily::Tricorn => {
            iterate::<TricornOrbit>(point, spec.julia_c, exponent, spec.max_iter)
        }
    }
}

/// Computes iteration fields for one plane and one spec.  Once built,
/// the renderer is not mutated.
pub struct EscapeRenderer {
    plane: PlaneMapper,
    spec: FractalSpec,
}

impl EscapeRenderer {
    /// Pairs a plane with the recurrence to run over it.
    pub fn new(plane: PlaneMapper, spec: FractalSpec) -> Self {
        EscapeRenderer { plane, spec }
    }

    /// The plane this renderer iterates over.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// The main function for single-threaded use.
    pub fn field_single(&self) -> Result<IterationField> {
        self.field_with(1, &|| false)
    }

    /// A multi-threaded version that takes a thread count.
    pub fn field(&self, threads: usize) -> Result<IterationField> {
        self.field_with(threads, &|| false)
    }

    /// Like `field`, but checks `cancelled` before every row and gives
    /// up with `Superseded` once it returns true.
    pub fn field_with(
        &self,
        threads: usize,
        cancelled: &(dyn Fn() -> bool + Sync),
    ) -> Result<IterationField> {
        self.spec.validate()?;
        let width = self.plane.integral_plane.0;
        let mut data = vec![0u32; self.plane.len()];
        let fill: fn(&PlaneMapper, &FractalSpec, usize, &mut [u32]) = match self.spec.family {
            FractalFamily::Mandelbrot => fill_row::<MandelbrotOrbit>,
            FractalFamily::Julia => fill_row::<JuliaOrbit>,
            FractalFamily::BurningShip => fill_row::<BurningShipOrbit>,
            FractalFamily::Tricorn => fill_row::<TricornOrbit>,
        };
        for_each_row(&mut data, width, threads, |y, row| {
            if cancelled() {
                return Err(RenderError::Superseded);
            }
            fill(&self.plane, &self.spec, y, row);
            Ok(())
        })?;
        Ok(IterationField {
            width,
            height: self.plane.integral_plane.1,
            max_iter: self.spec.max_iter,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::ViewWindow;

    fn renderer(view: ViewWindow, spec: FractalSpec) -> EscapeRenderer {
        EscapeRenderer::new(PlaneMapper::new(&view).unwrap(), spec)
    }

    #[test]
    fn family_names_parse() {
        assert_eq!("Mandelbrot".parse::<FractalFamily>().unwrap(), FractalFamily::Mandelbrot);
        assert_eq!("Burning Ship".parse::<FractalFamily>().unwrap(), FractalFamily::BurningShip);
        assert_eq!("burning_ship".parse::<FractalFamily>().unwrap(), FractalFamily::BurningShip);
        assert_eq!("TRICORN".parse::<FractalFamily>().unwrap(), FractalFamily::Tricorn);
        for family in FractalFamily::all() {
            assert_eq!(family.to_string().parse::<FractalFamily>().unwrap(), *family);
        }
        match "Newton".parse::<FractalFamily>() {
            Err(RenderError::InvalidFamily(name)) => assert_eq!(name, "Newton"),
            other => panic!("expected InvalidFamily, got {:?}", other),
        }
    }

    #[test]
    fn mandelbrot_origin_is_interior() {
        let spec = FractalSpec::new(FractalFamily::Mandelbrot, 50);
        assert_eq!(escape_time(&spec, Complex::new(0.0, 0.0)), 50);
    }

    #[test]
    fn mandelbrot_far_point_escapes_immediately() {
        let spec = FractalSpec::new(FractalFamily::Mandelbrot, 50);
        assert!(escape_time(&spec, Complex::new(2.0, 2.0)) < 2);
    }

    #[test]
    fn origin_pixel_of_an_odd_raster_is_interior() {
        let spec = FractalSpec::new(FractalFamily::Mandelbrot, 64);
        let field = renderer(ViewWindow::new(101, 101, 1.0, 0.0, 0.0), spec)
            .field(4)
            .unwrap();
        assert_eq!(field.get(&Pixel(50, 50)), 64);
        assert!(field.get(&Pixel(100, 0)) < 2);
    }

    #[test]
    fn field_values_stay_within_budget() {
        for family in FractalFamily::all() {
            let spec = FractalSpec::new(*family, 40)
                .with_power(3.5)
                .with_julia_c(Complex::new(-0.7, 0.27));
            let field = renderer(ViewWindow::new(48, 32, 1.3, -0.4, 0.2), spec)
                .field(3)
                .unwrap();
            assert_eq!(field.as_slice().len(), 48 * 32);
            assert!(field.as_slice().iter().all(|&v| v <= 40));
        }
    }

    #[test]
    fn julia_with_zero_constant_is_the_unit_disc() {
        let spec = FractalSpec::new(FractalFamily::Julia, 200);
        let view = ViewWindow::new(61, 61, 1.5, 0.0, 0.0);
        let render = renderer(view, spec);
        let field = render.field(2).unwrap();
        for y in 0..61 {
            for x in 0..61 {
                let z0 = render.plane().pixel_to_point(&Pixel(x, y));
                let value = field.get(&Pixel(x, y));
                if z0.norm() < 1.0 {
                    assert_eq!(value, 200, "{} should stay bounded", z0);
                } else if z0.norm() > 1.05 {
                    assert!(value < 200, "{} should escape", z0);
                }
            }
        }
    }

    #[test]
    fn threaded_and_single_fields_agree() {
        let spec = FractalSpec::new(FractalFamily::BurningShip, 80);
        let render = renderer(ViewWindow::new(40, 30, 1.0, -0.5, -0.5), spec);
        assert_eq!(render.field_single().unwrap(), render.field(5).unwrap());
    }

    #[test]
    fn integral_and_real_powers_agree() {
        let z = Complex::new(0.3, -0.4);
        let unrolled = Exponent::Integral(3).apply(z);
        let polar = Exponent::Real(3.0).apply(z);
        assert!((unrolled - polar).norm() < 1e-12);
    }

    #[test]
    fn tricorn_and_burning_ship_differ_from_mandelbrot() {
        let point = Complex::new(0.3, -0.9);
        let base = FractalSpec::new(FractalFamily::Mandelbrot, 100);
        let ship = FractalSpec::new(FractalFamily::BurningShip, 100);
        assert_ne!(escape_time(&base, point), escape_time(&ship, point));
        // Tricorn is symmetric under conjugation.
        let tricorn = FractalSpec::new(FractalFamily::Tricorn, 100);
        let p = Complex::new(0.2, 0.7);
        assert_eq!(escape_time(&tricorn, p), escape_time(&tricorn, p.conj()));
    }

    #[test]
    fn powers_below_one_are_rejected() {
        let view = ViewWindow::new(8, 8, 1.0, 0.0, 0.0);
        for &power in &[0.5, 0.0, -3.0, std::f64::NAN, std::f64::INFINITY] {
            let spec = FractalSpec::new(FractalFamily::Mandelbrot, 10).with_power(power);
            match renderer(view, spec).field(2) {
                Err(RenderError::InvalidPower(_)) => {}
                other => panic!("power {} gave {:?}", power, other.map(|f| f.width)),
            }
        }
        let spec = FractalSpec::new(FractalFamily::Julia, 10).with_power(1.0);
        assert!(renderer(view, spec).field(2).is_ok());
    }

    #[test]
    fn cancelled_fields_are_superseded() {
        let spec = FractalSpec::new(FractalFamily::Mandelbrot, 10);
        let render = renderer(ViewWindow::new(8, 8, 1.0, 0.0, 0.0), spec);
        match render.field_with(2, &|| true) {
            Err(RenderError::Superseded) => {}
            other => panic!("expected Superseded, got {:?}", other),
        }
    }
}
