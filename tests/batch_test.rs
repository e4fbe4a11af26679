//! Batch orchestration tests on real temp directories.

use std::fs;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use svopt::ThumbnailOptions;
use svopt::batch::{BatchOptions, collect_svg_files, run_batch};

const GOOD: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\"><!--x--><rect width=\"4\" height=\"4\"/></svg>";

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

#[test]
fn one_malformed_file_does_not_poison_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::write(dir.path().join("a.svg"), GOOD).unwrap();
    fs::write(dir.path().join("b.svg"), "<svg><rect></svg").unwrap();
    fs::write(dir.path().join("c.svg"), GOOD).unwrap();

    let opts = BatchOptions {
        out_dir: out.clone(),
        jobs: 2,
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path().to_str().unwrap(), &opts).unwrap();

    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(out.join("a.svg").is_file());
    assert!(out.join("c.svg").is_file());
    assert!(!out.join("b.svg").exists());

    let failed = summary
        .outcomes
        .iter()
        .find(|o| o.error.is_some())
        .unwrap();
    assert!(failed.source.ends_with("b.svg"));
}

#[test]
fn svgz_input_optimizes_identically_to_plain_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::write(dir.path().join("plain.svg"), GOOD).unwrap();
    fs::write(dir.path().join("packed.svgz"), gzip(GOOD.as_bytes())).unwrap();

    let opts = BatchOptions {
        out_dir: out.clone(),
        jobs: 1,
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path().to_str().unwrap(), &opts).unwrap();
    assert_eq!(summary.failed(), 0);

    let plain = fs::read_to_string(out.join("plain.svg")).unwrap();
    let packed = fs::read_to_string(out.join("packed.svgz")).unwrap();
    assert_eq!(plain, packed);
    assert!(!plain.contains("<!--"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::write(dir.path().join("a.svg"), GOOD).unwrap();

    let opts = BatchOptions {
        out_dir: out.clone(),
        dry_run: true,
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path().to_str().unwrap(), &opts).unwrap();
    assert_eq!(summary.succeeded(), 1);
    assert!(summary.outcomes[0].bytes_after > 0);
    assert!(!out.exists());
}

#[test]
fn glob_patterns_resolve() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.svg"), GOOD).unwrap();
    fs::write(dir.path().join("b.svg"), GOOD).unwrap();
    fs::write(dir.path().join("c.txt"), "no").unwrap();

    let pattern = format!("{}/*.svg", dir.path().display());
    let files = collect_svg_files(&pattern).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn png_export_lands_next_to_the_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::write(
        dir.path().join("a.svg"),
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 8 8\"><rect width=\"8\" height=\"8\" fill=\"#00f\"/></svg>",
    )
    .unwrap();

    let opts = BatchOptions {
        out_dir: out.clone(),
        export_png: true,
        jobs: 1,
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path().to_str().unwrap(), &opts).unwrap();
    assert_eq!(summary.failed(), 0);
    assert!(out.join("a.svg").is_file());
    let png = fs::read(out.join("a.png")).unwrap();
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn failed_png_export_marks_the_file_failed_but_keeps_the_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::write(dir.path().join("a.svg"), GOOD).unwrap();

    // Zero-sized thumbnails cannot be rasterized.
    let opts = BatchOptions {
        out_dir: out.clone(),
        export_png: true,
        thumbnail: ThumbnailOptions {
            width: 0,
            ..ThumbnailOptions::default()
        },
        jobs: 1,
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path().to_str().unwrap(), &opts).unwrap();
    assert_eq!(summary.failed(), 1);
    assert!(summary.outcomes[0].error.is_some());
    // The optimized SVG was written before the export attempt and stands.
    assert_eq!(summary.outcomes[0].dest, Some(out.join("a.svg")));
    assert!(out.join("a.svg").is_file());
    assert!(!out.join("a.png").exists());
}

#[test]
fn missing_input_is_a_preflight_error() {
    let err = run_batch("/definitely/not/here/*.svg", &BatchOptions::default()).unwrap_err();
    assert!(err.to_string().contains("no SVG files matched"));
}
