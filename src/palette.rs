// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Piecewise-linear colour gradients, and the mapping of an iteration
//! field through one of them.

use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};

use crate::bands::for_each_row;
use crate::error::{RenderError, Result};
use crate::escape::IterationField;

/// A gradient: control points `(stop, colour)` with stops ascending
/// from exactly 0 to exactly 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    stops: Vec<(f64, Rgb<u8>)>,
}

impl Palette {
    /// Builds a palette, rejecting tables with fewer than two stops,
    /// stops that do not start at 0 and end at 1, or stops that are
    /// not strictly ascending.
    pub fn new(stops: Vec<(f64, Rgb<u8>)>) -> Result<Palette> {
        if stops.len() < 2 {
            return Err(RenderError::InvalidPalette(
                "a palette needs at least two stops".to_string(),
            ));
        }
        if stops[0].0 != 0.0 || stops[stops.len() - 1].0 != 1.0 {
            return Err(RenderError::InvalidPalette(
                "palette stops must run from 0 to 1".to_string(),
            ));
        }
        if stops.windows(2).any(|pair| !(pair[0].0 < pair[1].0)) {
            return Err(RenderError::InvalidPalette(
                "palette stops must be strictly ascending".to_string(),
            ));
        }
        Ok(Palette { stops })
    }

    // Built-in tables are known good.
    fn from_table(table: &[(f64, [u8; 3])]) -> Palette {
        Palette {
            stops: table.iter().map(|&(stop, rgb)| (stop, Rgb(rgb))).collect(),
        }
    }

    /// The control points.
    pub fn stops(&self) -> &[(f64, Rgb<u8>)] {
        &self.stops
    }

    /// The colour at `t`, which is clamped into `[0, 1]`.  A `t` that
    /// lands exactly on a stop yields that stop's colour unchanged.
    pub fn color_at(&self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.max(0.0).min(1.0) };
        let last = self.stops.len() - 1;
        let bracket = self
            .stops
            .windows(2)
            .position(|pair| pair[0].0 <= t && t < pair[1].0)
            .unwrap_or(last - 1);
        let (low, from) = self.stops[bracket];
        let (high, to) = self.stops[bracket + 1];
        if t >= high {
            return to;
        }
        let frac = (t - low) / (high - low);
        let lerp = |a: u8, b: u8| -> u8 {
            let v = f64::from(a) + frac * (f64::from(b) - f64::from(a));
            v.max(0.0).min(255.0) as u8
        };
        Rgb([
            lerp(from[0], to[0]),
            lerp(from[1], to[1]),
            lerp(from[2], to[2]),
        ])
    }

    /// Colours an iteration field: each value is normalized by the
    /// field's budget (a zero budget normalizes everything to 0).
    pub fn colorize(&self, field: &IterationField, threads: usize) -> Result<RgbImage> {
        let (width, height) = (field.width as u32, field.height as u32);
        let mut raw = vec![0u8; field.width * field.height * 3];
        for_each_row(&mut raw, field.width * 3, threads, |y, row| {
            let source = &field.data[y * field.width..(y + 1) * field.width];
            for (pixel, &iteration) in row.chunks_mut(3).zip(source) {
                let t = if field.max_iter == 0 {
                    0.0
                } else {
                    f64::from(iteration) / f64::from(field.max_iter)
                };
                pixel.copy_from_slice(&self.color_at(t).0);
            }
            Ok(())
        })?;
        RgbImage::from_raw(width, height, raw).ok_or(RenderError::BufferMismatch(width, height))
    }
}

/// The ten built-in gradients.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaletteName {
    /// Deep blue through green and brown to white.
    Forest,
    /// Greys with a red band.
    City,
    /// Red, orange, yellow, green, blue.
    Dream,
    /// Navy through sky blue to white.
    Ocean,
    /// Sand and ochre.
    Desert,
    /// Black into violet.
    Space,
    /// ROYGBIV.
    Rainbow,
    /// Dark red to pale yellow.
    Fire,
    /// Deep blue to white.
    Ice,
    /// After matplotlib's inferno.
    Inferno,
}

const FOREST: &[(f64, [u8; 3])] = &[
    (0.0, [0, 0, 128]),
    (0.3, [34, 139, 34]),
    (0.6, [139, 69, 19]),
    (1.0, [255, 255, 255]),
];
const CITY: &[(f64, [u8; 3])] = &[
    (0.0, [50, 50, 50]),
    (0.4, [100, 100, 100]),
    (0.7, [200, 0, 0]),
    (1.0, [255, 255, 255]),
];
const DREAM: &[(f64, [u8; 3])] = &[
    (0.0, [255, 0, 0]),
    (0.25, [255, 165, 0]),
    (0.5, [255, 255, 0]),
    (0.75, [0, 128, 0]),
    (1.0, [0, 0, 255]),
];
const OCEAN: &[(f64, [u8; 3])] = &[
    (0.0, [0, 0, 50]),
    (0.3, [0, 100, 200]),
    (0.6, [100, 200, 255]),
    (1.0, [255, 255, 255]),
];
const DESERT: &[(f64, [u8; 3])] = &[
    (0.0, [200, 100, 0]),
    (0.3, [255, 200, 100]),
    (0.6, [255, 150, 50]),
    (1.0, [255, 255, 200]),
];
const SPACE: &[(f64, [u8; 3])] = &[
    (0.0, [0, 0, 0]),
    (0.3, [50, 0, 100]),
    (0.6, [100, 0, 200]),
    (1.0, [200, 100, 255]),
];
const RAINBOW: &[(f64, [u8; 3])] = &[
    (0.0, [255, 0, 0]),
    (0.16, [255, 165, 0]),
    (0.33, [255, 255, 0]),
    (0.5, [0, 128, 0]),
    (0.66, [0, 0, 255]),
    (0.83, [75, 0, 130]),
    (1.0, [148, 0, 211]),
];
const FIRE: &[(f64, [u8; 3])] = &[
    (0.0, [50, 0, 0]),
    (0.4, [200, 0, 0]),
    (0.8, [255, 140, 0]),
    (1.0, [255, 255, 200]),
];
const ICE: &[(f64, [u8; 3])] = &[
    (0.0, [0, 0, 100]),
    (0.4, [0, 100, 200]),
    (0.8, [150, 200, 255]),
    (1.0, [255, 255, 255]),
];
const INFERNO: &[(f64, [u8; 3])] = &[
    (0.0, [0, 0, 4]),
    (0.25, [87, 15, 109]),
    (0.5, [187, 55, 84]),
    (0.75, [249, 142, 50]),
    (1.0, [255, 255, 85]),
];

impl PaletteName {
    /// All built-ins, in menu order.
    pub fn all() -> &'static [PaletteName] {
        &[
            PaletteName::Forest,
            PaletteName::City,
            PaletteName::Dream,
            PaletteName::Ocean,
            PaletteName::Desert,
            PaletteName::Space,
            PaletteName::Rainbow,
            PaletteName::Fire,
            PaletteName::Ice,
            PaletteName::Inferno,
        ]
    }

    fn table(self) -> &'static [(f64, [u8; 3])] {
        match self {
            PaletteName::Forest => FOREST,
            PaletteName::City => CITY,
            PaletteName::Dream => DREAM,
            PaletteName::Ocean => OCEAN,
            PaletteName::Desert => DESERT,
            PaletteName::Space => SPACE,
            PaletteName::Rainbow => RAINBOW,
            PaletteName::Fire => FIRE,
            PaletteName::Ice => ICE,
            PaletteName::Inferno => INFERNO,
        }
    }

    /// The gradient this name stands for.
    pub fn palette(self) -> Palette {
        Palette::from_table(self.table())
    }
}

impl fmt::Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for PaletteName {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        PaletteName::all()
            .iter()
            .find(|name| name.to_string().eq_ignore_ascii_case(key))
            .cloned()
            .ok_or_else(|| RenderError::InvalidPalette(format!("unknown palette {:?}", s)))
    }
}
