//! End-to-end generation runs against real files in temporary directories

use image::{Rgb, RgbImage};
use photomosaic::algorithm::{MosaicEngine, MosaicRequest, RunStatus, plan_request};
use photomosaic::analysis::cache::PhotoSource;
use photomosaic::io::image::{FitMode, probe_orientation};
use photomosaic::spatial::grid::{CellSettings, CellShape, PrintSettings};
use std::path::{Path, PathBuf};

fn write_solid(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let Ok(()) = image.save(path) else {
        unreachable!("failed to write fixture image {}", path.display());
    };
}

fn write_quadrant_primary(path: &Path, size: u32) {
    let mut image = RgbImage::new(size, size);
    let half = size / 2;
    for y in 0..size {
        for x in 0..size {
            let color = match (x < half, y < half) {
                (true, true) => [255, 0, 0],
                (false, true) => [0, 255, 0],
                (true, false) => [0, 0, 255],
                (false, false) => [255, 255, 255],
            };
            image.put_pixel(x, y, Rgb(color));
        }
    }
    let Ok(()) = image.save(path) else {
        unreachable!("failed to write fixture image {}", path.display());
    };
}

fn photo_sources(paths: &[PathBuf]) -> Vec<PhotoSource> {
    paths
        .iter()
        .map(|path| {
            let Ok(orientation) = probe_orientation(path) else {
                unreachable!("failed to probe {}", path.display());
            };
            PhotoSource {
                path: path.clone(),
                orientation,
            }
        })
        .collect()
}

fn base_request(primary: &Path, photos: Vec<PhotoSource>, output_dir: &Path) -> MosaicRequest {
    MosaicRequest {
        primary_image: primary.to_path_buf(),
        photos,
        print: PrintSettings {
            width_in: 2.0,
            height_in: 2.0,
            resolution: 100,
        },
        cell: CellSettings {
            size_mm: 25.4,
            shape: CellShape::Square,
        },
        fit: FitMode::CropCenter,
        pattern: String::from("square"),
        preserve_aspect: false,
        color_blend_percent: 0,
        duplicate_spacing: None,
        candidates_considered: 1,
        use_all_images: false,
        write_report: false,
        max_uses_override: None,
        output_dir: output_dir.to_path_buf(),
        seed: 11,
    }
}

#[test]
fn distinct_colors_map_to_their_nearest_cells() {
    let Ok(dir) = tempfile::tempdir() else {
        unreachable!("failed to create temp dir");
    };
    let primary = dir.path().join("target.png");
    write_quadrant_primary(&primary, 200);

    let colors = [
        ("red", [255, 0, 0]),
        ("green", [0, 255, 0]),
        ("blue", [0, 0, 255]),
        ("white", [255, 255, 255]),
    ];
    let paths: Vec<PathBuf> = colors
        .iter()
        .map(|(name, color)| {
            let path = dir.path().join(format!("{name}.png"));
            write_solid(&path, 120, 120, *color);
            path
        })
        .collect();

    let mut request = base_request(&primary, photo_sources(&paths), dir.path());
    request.write_report = true;

    let Ok(plan) = plan_request(&request) else {
        unreachable!("plan request failed");
    };
    assert_eq!(plan.total_cells, 4);
    assert_eq!(plan.recommended_max_uses, 1);

    let summary = MosaicEngine::new(request).generate();
    assert_eq!(summary.status, RunStatus::Complete, "{:?}", summary.error);
    assert_eq!((summary.rows, summary.cols), (2, 2));
    assert_eq!(summary.placements_total, 4);
    assert_eq!(summary.placements_filled, 4);
    assert_eq!(summary.distinct_photos_used, 4);

    // With a shortlist of one there is no randomness: each quadrant gets
    // the photo of its own color.
    let Some(mosaic_path) = summary.mosaic_path.as_ref() else {
        unreachable!("mosaic path missing");
    };
    let Ok(mosaic) = image::open(mosaic_path) else {
        unreachable!("failed to reload mosaic");
    };
    let mosaic = mosaic.into_rgb8();
    assert_eq!(mosaic.get_pixel(50, 50).0, [255, 0, 0]);
    assert_eq!(mosaic.get_pixel(150, 50).0, [0, 255, 0]);
    assert_eq!(mosaic.get_pixel(50, 150).0, [0, 0, 255]);
    assert_eq!(mosaic.get_pixel(150, 150).0, [255, 255, 255]);

    // Every cached photo appears in the report, used once each
    let Some(report_path) = summary.report_path.as_ref() else {
        unreachable!("report path missing");
    };
    let content = std::fs::read_to_string(report_path).unwrap_or_default();
    let rows: Vec<&str> = content.lines().skip(1).collect();
    assert_eq!(rows.len(), 4);
    for (name, _) in &colors {
        assert!(
            rows.iter().any(|row| row.starts_with(&format!("{name}.png,1,"))),
            "missing report row for {name}: {content}"
        );
    }
}

#[test]
fn exhausted_libraries_leave_cells_unfilled_without_failing() {
    let Ok(dir) = tempfile::tempdir() else {
        unreachable!("failed to create temp dir");
    };
    let primary = dir.path().join("strip.png");
    write_solid(&primary, 300, 100, [90, 90, 90]);

    let paths: Vec<PathBuf> = [[10u8, 10, 10], [200, 200, 200]]
        .iter()
        .enumerate()
        .map(|(index, color)| {
            let path = dir.path().join(format!("photo{index}.png"));
            write_solid(&path, 100, 100, *color);
            path
        })
        .collect();

    let mut request = base_request(&primary, photo_sources(&paths), dir.path());
    request.print = PrintSettings {
        width_in: 3.0,
        height_in: 1.0,
        resolution: 100,
    };
    request.max_uses_override = Some(1);

    let summary = MosaicEngine::new(request).generate();
    assert_eq!(summary.status, RunStatus::Complete, "{:?}", summary.error);
    assert_eq!(summary.placements_total, 3);
    assert_eq!(summary.placements_filled, 2);
    assert_eq!(summary.distinct_photos_used, 2);
}

#[test]
fn cancellation_during_cache_build_yields_the_cancelled_status() {
    let Ok(dir) = tempfile::tempdir() else {
        unreachable!("failed to create temp dir");
    };
    let primary = dir.path().join("target.png");
    write_quadrant_primary(&primary, 200);

    let paths: Vec<PathBuf> = (0..6)
        .map(|index| {
            let path = dir.path().join(format!("photo{index}.png"));
            write_solid(&path, 100, 100, [index * 40, 0, 0]);
            path
        })
        .collect();

    let request = base_request(&primary, photo_sources(&paths), dir.path());
    let engine = MosaicEngine::new(request);
    let token = engine.cancel_token();
    let engine = engine.with_progress(Box::new(move |_, label| {
        if label == "Analyzing photos" {
            token.cancel();
        }
    }));

    let summary = engine.generate();
    assert_eq!(summary.status, RunStatus::Cancelled);
    assert!(summary.error.is_none());
    assert!(summary.mosaic_path.is_none());
}

#[test]
fn parquet_runs_complete_with_interlocked_counts() {
    let Ok(dir) = tempfile::tempdir() else {
        unreachable!("failed to create temp dir");
    };
    let primary = dir.path().join("scene.png");
    write_solid(&primary, 400, 300, [60, 120, 180]);

    let mut paths = Vec::new();
    for index in 0u8..4 {
        let landscape = dir.path().join(format!("landscape{index}.png"));
        write_solid(&landscape, 120, 90, [index * 60, 120, 40]);
        paths.push(landscape);
        let portrait = dir.path().join(format!("portrait{index}.png"));
        write_solid(&portrait, 90, 120, [40, index * 60, 200]);
        paths.push(portrait);
    }

    let mut request = base_request(&primary, photo_sources(&paths), dir.path());
    request.print = PrintSettings {
        width_in: 4.0,
        height_in: 3.0,
        resolution: 100,
    };
    request.cell = CellSettings {
        size_mm: 25.4,
        shape: CellShape::FourByThree,
    };
    request.pattern = String::from("Parquet 2L 1P");
    request.candidates_considered = 3;
    request.use_all_images = true;

    let Ok(plan) = plan_request(&request) else {
        unreachable!("plan request failed");
    };
    assert!(plan.landscape_cells > 0 && plan.portrait_cells > 0);

    let summary = MosaicEngine::new(request).generate();
    assert_eq!(summary.status, RunStatus::Complete, "{:?}", summary.error);
    assert_eq!(
        summary.placements_total,
        plan.landscape_cells + plan.portrait_cells
    );
    assert!(summary.placements_filled > 0);
    // The use-all pre-pass should touch most of the small library
    assert!(summary.distinct_photos_used >= 4);
}

#[test]
fn missing_primary_image_fails_before_any_work() {
    let Ok(dir) = tempfile::tempdir() else {
        unreachable!("failed to create temp dir");
    };
    let photo = dir.path().join("photo.png");
    write_solid(&photo, 50, 50, [1, 2, 3]);

    let request = base_request(
        &dir.path().join("missing.png"),
        photo_sources(&[photo]),
        dir.path(),
    );
    let summary = MosaicEngine::new(request).generate();
    assert_eq!(summary.status, RunStatus::Failed);
    assert!(summary.error.is_some());
    assert!(summary.mosaic_path.is_none());
}
