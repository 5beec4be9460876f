extern crate fractal_weaver;
extern crate image;
extern crate num;

use fractal_weaver::{
    render, render_sequence, FilterKind, FractalFamily, FractalSpec, Layers, NearestNeighborSwirl,
    PaletteName, RenderError, RenderSettings, Renderer, SingleFlight, ViewWindow,
};
use image::{Rgba, RgbaImage};
use num::Complex;

fn fire_view() -> (ViewWindow, FractalSpec) {
    (
        ViewWindow::new(100, 100, 1.0, 0.0, 0.0),
        FractalSpec::new(FractalFamily::Mandelbrot, 100),
    )
}

#[test]
fn mandelbrot_in_fire() {
    let (view, spec) = fire_view();
    let image = render(
        view,
        spec,
        &PaletteName::Fire.palette(),
        FilterKind::None,
        false,
        false,
        None,
        None,
    )
    .unwrap();
    assert_eq!(image.dimensions(), (100, 100));
    assert_eq!(*image.get_pixel(50, 50), Rgba([255, 255, 200, 255]));
    assert_eq!(*image.get_pixel(0, 0), Rgba([50, 0, 0, 255]));
    assert_eq!(*image.get_pixel(99, 99), Rgba([50, 0, 0, 255]));
}

#[test]
fn zero_width_is_an_error() {
    let spec = FractalSpec::new(FractalFamily::Mandelbrot, 100);
    let result = render(
        ViewWindow::new(0, 100, 1.0, 0.0, 0.0),
        spec,
        &PaletteName::Fire.palette(),
        FilterKind::None,
        false,
        false,
        None,
        None,
    );
    match result {
        Err(RenderError::InvalidDimensions { width: 0, height: 100 }) => {}
        Err(e) => panic!("wrong error: {}", e),
        Ok(_) => panic!("rendered a zero-width image"),
    }
}

#[test]
fn non_positive_zoom_is_an_error() {
    let (mut view, spec) = fire_view();
    view.zoom = 0.0;
    let result = render(
        view,
        spec,
        &PaletteName::Fire.palette(),
        FilterKind::None,
        false,
        false,
        None,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn sketch_strokes_cover_the_fractal_and_gaps_show_it() {
    let mut sketch = RgbaImage::new(100, 100);
    for x in 0..100 {
        sketch.put_pixel(x, 10, Rgba([0, 0, 255, 255]));
    }
    let (view, spec) = fire_view();
    let settings = RenderSettings {
        view,
        spec,
        palette: PaletteName::Fire.palette(),
        ..RenderSettings::default()
    };
    let renderer = Renderer::new();
    let layers = Layers {
        background: None,
        sketch: Some(&sketch),
    };
    let woven = renderer.render(&settings, &layers).unwrap();
    let plain = renderer.render(&settings, &Layers::none()).unwrap();

    assert_eq!(*woven.get_pixel(40, 10), Rgba([0, 0, 255, 255]));
    assert_eq!(woven.get_pixel(50, 50), plain.get_pixel(50, 50));

    let unwoven = renderer
        .render(
            &RenderSettings {
                weave: false,
                ..settings.clone()
            },
            &layers,
        )
        .unwrap();
    assert_eq!(unwoven, plain);
}

#[test]
fn layers_of_any_size_are_fitted_without_touching_them() {
    let background = RgbaImage::from_pixel(33, 17, Rgba([9, 9, 9, 255]));
    let sketch = RgbaImage::from_pixel(250, 40, Rgba([0, 0, 0, 0]));
    let (before_bg, before_sketch) = (background.clone(), sketch.clone());
    let (view, spec) = fire_view();
    let image = render(
        view,
        spec,
        &PaletteName::Ocean.palette(),
        FilterKind::Emboss,
        false,
        false,
        Some(&background),
        Some(&sketch),
    )
    .unwrap();
    assert_eq!(image.dimensions(), (100, 100));
    assert!(image.pixels().all(|p| p[3] == 255));
    assert_eq!(background, before_bg);
    assert_eq!(sketch, before_sketch);
}

#[test]
fn julia_and_friends_render() {
    let palette = PaletteName::Rainbow.palette();
    for family in FractalFamily::all() {
        let spec = FractalSpec::new(*family, 50)
            .with_power(3.0)
            .with_julia_c(Complex::new(-0.8, 0.156));
        let image = render(
            ViewWindow::new(32, 24, 1.5, 0.0, 0.0),
            spec,
            &palette,
            FilterKind::Sharpen,
            false,
            true,
            None,
            None,
        )
        .unwrap();
        assert_eq!(image.dimensions(), (32, 24), "{}", family);
    }
}

#[test]
fn animation_ramps_the_zoom() {
    let (_, spec) = fire_view();
    let sequence = render_sequence(
        ViewWindow::new(24, 24, 2.0, -0.5, 0.0),
        spec,
        &PaletteName::Dream.palette(),
        FilterKind::None,
        false,
        false,
        None,
        None,
        4,
        0.25,
    )
    .unwrap();
    assert_eq!(sequence.len(), 4);
    assert_eq!(sequence.zooms, vec![2.0, 2.5, 3.0, 3.5]);
    assert!(sequence.frames.iter().all(|f| f.dimensions() == (24, 24)));
    assert_ne!(sequence.frames[0], sequence.frames[3]);
}

#[test]
fn each_frame_matches_a_standalone_render_at_its_zoom() {
    let (view, spec) = fire_view();
    let palette = PaletteName::Fire.palette();
    let sequence = render_sequence(
        view,
        spec,
        &palette,
        FilterKind::None,
        false,
        false,
        None,
        None,
        5,
        0.2,
    )
    .unwrap();
    assert_eq!(sequence.len(), 5);
    for (i, frame) in sequence.frames.iter().enumerate() {
        let zoom = view.zoom * (1.0 + i as f64 * 0.2);
        assert!((sequence.zooms[i] - zoom).abs() < 1e-12, "frame {} zoom", i);
        let mut framed = view;
        framed.zoom = zoom;
        let standalone = render(
            framed,
            spec,
            &palette,
            FilterKind::None,
            false,
            false,
            None,
            None,
        )
        .unwrap();
        assert!(*frame == standalone, "frame {} differs from a render at zoom {}", i, zoom);
    }
}

#[test]
fn fallback_swirl_matches_the_raster_size() {
    let (view, spec) = fire_view();
    let settings = RenderSettings {
        view,
        spec,
        filter: FilterKind::Swirl,
        nightmare: true,
        seed: Some(7),
        ..RenderSettings::default()
    };
    let image = Renderer::new()
        .with_swirl(Box::new(NearestNeighborSwirl))
        .render(&settings, &Layers::none())
        .unwrap();
    assert_eq!(image.dimensions(), (100, 100));
}

#[test]
fn only_the_latest_request_is_delivered() {
    let (view, spec) = fire_view();
    let settings = RenderSettings {
        view,
        spec,
        ..RenderSettings::default()
    };
    let renderer = Renderer::new().with_threads(2);
    let preview = SingleFlight::new();

    let old = preview.begin();
    let new = preview.begin();
    let stale = renderer.render_ticketed(&settings, &Layers::none(), &old);
    let fresh = renderer.render_ticketed(&settings, &Layers::none(), &new);

    assert!(old.deliver(stale).is_none());
    let delivered = new.deliver(fresh).expect("current request was dropped");
    assert_eq!(delivered.unwrap().dimensions(), (100, 100));
}
