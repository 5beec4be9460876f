extern crate assert_cmd;
extern crate image;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::process::Command;

fn weave() -> Command {
    Command::cargo_bin("weave").unwrap()
}

#[test]
fn renders_a_png() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("m.png");
    weave()
        .args(&["-o", out.to_str().unwrap(), "-s", "64x48", "-i", "80", "--palette", "fire"])
        .assert()
        .success();
    let image = image::open(&out).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (64, 48));
}

#[test]
fn negative_centers_and_constants_parse() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("j.png");
    weave()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "40x30",
            "--family",
            "Burning Ship",
            "--center",
            "-0.5,-0.5",
            "--julia",
            "-0.8,0.156",
            "--filter",
            "contour",
            "--invert",
        ])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn layers_are_loaded_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let sketch_path = dir.path().join("sketch.png");
    let mut sketch = RgbaImage::new(20, 20);
    sketch.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
    sketch.save(&sketch_path).unwrap();
    let out = dir.path().join("woven.png");

    weave()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "20x20",
            "--sketch",
            sketch_path.to_str().unwrap(),
        ])
        .assert()
        .success();
    let image = image::open(&out).unwrap().to_rgba8();
    assert_eq!(*image.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
}

#[test]
fn animations_are_written_as_gifs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("zoom.gif");
    weave()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "24x24",
            "--frames",
            "3",
            "--preset",
            "seahorse",
            "--nightmare",
            "--seed",
            "11",
        ])
        .assert()
        .success();
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
}

#[test]
fn small_animations_run_without_a_cost_warning() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("quiet.gif");
    weave()
        .args(&["-o", out.to_str().unwrap(), "-s", "16x16", "--frames", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("frames").not());
}

#[test]
fn unknown_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.png");
    weave()
        .args(&["-o", out.to_str().unwrap(), "--family", "newton"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("newton"));
    weave()
        .args(&["-o", out.to_str().unwrap(), "--palette", "mauve"])
        .assert()
        .failure();
}

#[test]
fn powers_below_one_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for power in &["0.5", "-3"] {
        let out = dir.path().join("p.png");
        weave()
            .args(&["-o", out.to_str().unwrap(), "-s", "16x16", "--power", *power])
            .assert()
            .failure();
        assert!(!out.exists(), "power {} wrote an image", power);
    }
    let out = dir.path().join("cubic.png");
    weave()
        .args(&["-o", out.to_str().unwrap(), "-s", "16x16", "--power", "3"])
        .assert()
        .success();
}

#[test]
fn bad_sizes_are_rejected() {
    weave()
        .args(&["-o", "never.png", "-s", "800by600"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn zero_sized_renders_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("empty.png");
    weave()
        .args(&["-o", out.to_str().unwrap(), "-s", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid dimensions"));
    assert!(!out.exists());
}

#[test]
fn a_missing_sketch_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.png");
    weave()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "10x10",
            "--sketch",
            dir.path().join("nope.png").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sketch"));
}
