// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate fractal_weaver;
extern crate image;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use fractal_weaver::export::{save_animation, save_image};
use fractal_weaver::{
    FilterKind, FractalFamily, Layers, PaletteName, Preset, RenderSettings, Renderer,
};
use image::RgbaImage;
use num::Complex;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_name<T>(s: &str) -> Result<(), String>
where
    T: FromStr,
    T::Err: Display,
{
    T::from_str(s).map(|_| ()).map_err(|e| e.to_string())
}

fn value<T>(matches: &ArgMatches, name: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing --{}", name))?;
    T::from_str(raw).map_err(|e| format_err!("bad --{} {:?}: {}", name, raw, e))
}

fn pair<T: FromStr>(matches: &ArgMatches, name: &str, separator: char) -> Result<(T, T), Error> {
    matches
        .value_of(name)
        .and_then(|s| parse_pair(s, separator))
        .ok_or_else(|| format_err!("bad --{}", name))
}

fn complex(matches: &ArgMatches, name: &str) -> Result<Complex<f64>, Error> {
    matches
        .value_of(name)
        .and_then(parse_complex)
        .ok_or_else(|| format_err!("bad --{}", name))
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const POWER: &str = "power";
const JULIA: &str = "julia";
const FAMILY: &str = "family";
const PALETTE: &str = "palette";
const FILTER: &str = "filter";
const NIGHTMARE: &str = "nightmare";
const INVERT: &str = "invert";
const NO_WEAVE: &str = "no-weave";
const BACKGROUND: &str = "background";
const SKETCH: &str = "sketch";
const FRAMES: &str = "frames";
const FRAME_DURATION: &str = "frame-duration";
const ZOOM_STEP: &str = "zoom-step";
const THREADS: &str = "threads";
const SEED: &str = "seed";
const PRESET: &str = "preset";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("weave")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; .png, .jpg, or .gif with --frames"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse view center"))
                .help("Point of the complex plane at the middle of the image"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse zoom",
                        "Zoom must be greater than zero",
                    )
                })
                .help("Magnification; 1 shows 5 units of the real axis"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("256")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 200000",
                    )
                })
                .help("Iteration budget per pixel"),
        )
        .arg(
            Arg::with_name(POWER)
                .long(POWER)
                .short("p")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        1.0,
                        64.0,
                        "Could not parse power",
                        "Power must be between 1 and 64",
                    )
                })
                .help("Exponent of the recurrence"),
        )
        .arg(
            Arg::with_name(JULIA)
                .long(JULIA)
                .short("j")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.7,0.27")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Constant c of the Julia family"),
        )
        .arg(
            Arg::with_name(FAMILY)
                .long(FAMILY)
                .short("f")
                .takes_value(true)
                .default_value("mandelbrot")
                .validator(|s| validate_name::<FractalFamily>(&s))
                .help("mandelbrot, julia, burning-ship or tricorn"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .takes_value(true)
                .default_value("dream")
                .validator(|s| validate_name::<PaletteName>(&s))
                .help("Colour gradient, e.g. fire, ice, forest, inferno"),
        )
        .arg(
            Arg::with_name(FILTER)
                .long(FILTER)
                .takes_value(true)
                .default_value("none")
                .validator(|s| validate_name::<FilterKind>(&s))
                .help("none, blur, edge, invert, swirl, emboss, sharpen or contour"),
        )
        .arg(
            Arg::with_name(NIGHTMARE)
                .long(NIGHTMARE)
                .help("Add noise and wave jitter; doubles the swirl"),
        )
        .arg(
            Arg::with_name(INVERT)
                .long(INVERT)
                .help("Invert the colours after filtering"),
        )
        .arg(
            Arg::with_name(NO_WEAVE)
                .long(NO_WEAVE)
                .help("Do not paste the sketch layer"),
        )
        .arg(
            Arg::with_name(BACKGROUND)
                .long(BACKGROUND)
                .takes_value(true)
                .help("Image laid over the fractal before the sketch"),
        )
        .arg(
            Arg::with_name(SKETCH)
                .long(SKETCH)
                .takes_value(true)
                .help("Transparent drawing pasted on top"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        10_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 10000",
                    )
                })
                .help("Render a zoom animation of this many frames as a GIF"),
        )
        .arg(
            Arg::with_name(FRAME_DURATION)
                .long(FRAME_DURATION)
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        60_000,
                        "Could not parse frame duration",
                        "Frame duration must be between 1 and 60000 ms",
                    )
                })
                .help("Milliseconds each animation frame is shown"),
        )
        .arg(
            Arg::with_name(ZOOM_STEP)
                .long(ZOOM_STEP)
                .takes_value(true)
                .default_value("0.2")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        100.0,
                        "Could not parse zoom step",
                        "Zoom step must be between 0 and 100",
                    )
                })
                .help("Zoom growth per animation frame"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads; defaults to one per CPU"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| validate_name::<u64>(&s))
                .help("Seed for nightmare mode, for repeatable output"),
        )
        .arg(
            Arg::with_name(PRESET)
                .long(PRESET)
                .takes_value(true)
                .validator(|s| validate_name::<Preset>(&s))
                .help("spiral or seahorse; overrides family, center, zoom, power and Julia constant"),
        )
        .get_matches()
}

fn settings(matches: &ArgMatches) -> Result<RenderSettings, Error> {
    let mut settings = RenderSettings::default();
    let (width, height) = pair::<u32>(matches, SIZE, 'x')?;
    let (center_x, center_y) = pair::<f64>(matches, CENTER, ',')?;
    settings.view.width = width;
    settings.view.height = height;
    settings.view.center_x = center_x;
    settings.view.center_y = center_y;
    settings.view.zoom = value(matches, ZOOM)?;
    settings.spec.family = value(matches, FAMILY)?;
    settings.spec.max_iter = value(matches, ITERATIONS)?;
    settings.spec.power = value(matches, POWER)?;
    settings.spec.julia_c = complex(matches, JULIA)?;
    settings.palette = value::<PaletteName>(matches, PALETTE)?.palette();
    settings.filter = value(matches, FILTER)?;
    settings.nightmare = matches.is_present(NIGHTMARE);
    settings.invert = matches.is_present(INVERT);
    settings.weave = !matches.is_present(NO_WEAVE);
    settings.frame_duration = Duration::from_millis(value(matches, FRAME_DURATION)?);
    settings.zoom_step = value(matches, ZOOM_STEP)?;
    if matches.is_present(FRAMES) {
        settings.frames = value(matches, FRAMES)?;
    }
    if matches.is_present(SEED) {
        settings.seed = Some(value(matches, SEED)?);
    }
    if matches.is_present(PRESET) {
        settings.apply_preset(value(matches, PRESET)?);
    }
    Ok(settings)
}

fn layer(matches: &ArgMatches, name: &str) -> Result<Option<RgbaImage>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(path) => {
            let image = image::open(path)
                .map_err(|e| format_err!("could not load {} layer {}: {}", name, path, e))?;
            Ok(Some(image.to_rgba8()))
        }
    }
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let settings = settings(matches)?;
    let threads = if matches.is_present(THREADS) {
        value(matches, THREADS)?
    } else {
        fractal_weaver::default_threads()
    };
    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("missing --{}", OUTPUT))?;
    let background = layer(matches, BACKGROUND)?;
    let sketch = layer(matches, SKETCH)?;
    let layers = Layers {
        background: background.as_ref(),
        sketch: sketch.as_ref(),
    };

    let renderer = Renderer::new().with_threads(threads);
    info!(
        "{} {}x{} on {} threads, swirl backend {}",
        settings.spec.family,
        settings.view.width,
        settings.view.height,
        renderer.threads(),
        renderer.swirl_backend()
    );

    if matches.is_present(FRAMES) {
        let sequence = renderer.render_sequence(&settings, &layers)?;
        save_animation(output, &sequence)?;
    } else {
        let image = renderer.render(&settings, &layers)?;
        save_image(output, &image)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
