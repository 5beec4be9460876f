#[macro_use]
extern crate criterion;
extern crate fractal_weaver;

use criterion::Criterion;
use fractal_weaver::{
    EscapeRenderer, FilterKind, FractalFamily, FractalSpec, Layers, NearestNeighborSwirl,
    PlaneMapper, RenderSettings, Renderer, ViewWindow,
};

fn view() -> ViewWindow {
    ViewWindow::new(320, 240, 1.0, -0.5, 0.0)
}

fn escape_field(c: &mut Criterion) {
    let plane = PlaneMapper::new(&view()).unwrap();
    let engine = EscapeRenderer::new(plane, FractalSpec::new(FractalFamily::Mandelbrot, 256));
    c.bench_function("escape 320x240 single", move |b| {
        b.iter(|| engine.field_single().unwrap())
    });
}

fn full_render(c: &mut Criterion) {
    let renderer = Renderer::new();
    let settings = RenderSettings {
        view: view(),
        ..RenderSettings::default()
    };
    c.bench_function("render 320x240", move |b| {
        b.iter(|| renderer.render(&settings, &Layers::none()).unwrap())
    });
}

fn swirl_paths(c: &mut Criterion) {
    let settings = RenderSettings {
        view: view(),
        filter: FilterKind::Swirl,
        ..RenderSettings::default()
    };
    let interpolated = Renderer::new();
    let fallback = Renderer::new().with_swirl(Box::new(NearestNeighborSwirl));
    let fallback_settings = settings.clone();
    c.bench_function("swirl interpolated", move |b| {
        b.iter(|| interpolated.render(&settings, &Layers::none()).unwrap())
    });
    c.bench_function("swirl nearest", move |b| {
        b.iter(|| fallback.render(&fallback_settings, &Layers::none()).unwrap())
    });
}

criterion_group!(benches, escape_field, full_render, swirl_paths);
criterion_main!(benches);
