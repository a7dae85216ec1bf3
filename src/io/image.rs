//! Image codec seam over the `image` crate
//!
//! The engine goes through these wrappers for every decode, resize, blend,
//! and save; the rest of the crate never touches codec types beyond
//! `RgbImage` buffers.

use crate::io::error::{MosaicError, Result};
use crate::math::color::Rgb;
use crate::spatial::pattern::Orientation;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// How a photo is mapped onto a cell footprint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitMode {
    /// Distort the photo to exactly the footprint
    Stretch,
    /// Scale to cover, then crop centered
    CropCenter,
}

/// Read image dimensions from the file header without a full decode
///
/// # Errors
///
/// Returns [`MosaicError::ImageLoad`] when the file cannot be read or its
/// format is not recognized.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).map_err(|source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Classify a photo's orientation from its header dimensions
///
/// # Errors
///
/// Returns [`MosaicError::ImageLoad`] when the header cannot be read.
pub fn probe_orientation(path: &Path) -> Result<Orientation> {
    let (width, height) = probe_dimensions(path)?;
    Ok(Orientation::from_dimensions(width, height))
}

/// Fully decode an image into an RGB buffer
///
/// # Errors
///
/// Returns [`MosaicError::ImageLoad`] when decoding fails.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let decoded = image::open(path).map_err(|source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.into_rgb8())
}

/// Decode an image and downscale it to fit within the given bounds
///
/// Aspect ratio is preserved; images already within bounds are returned
/// at their native size.
///
/// # Errors
///
/// Returns [`MosaicError::ImageLoad`] when decoding fails.
pub fn load_bounded(path: &Path, max_width: u32, max_height: u32) -> Result<RgbImage> {
    let decoded = image::open(path).map_err(|source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    if decoded.width() <= max_width && decoded.height() <= max_height {
        return Ok(decoded.into_rgb8());
    }
    Ok(decoded.thumbnail(max_width, max_height).into_rgb8())
}

/// Resize a photo onto an exact footprint using the given fit mode
pub fn fit_to_cell(image: &RgbImage, width: u32, height: u32, fit: FitMode) -> RgbImage {
    let dynamic = DynamicImage::ImageRgb8(image.clone());
    let fitted = match fit {
        FitMode::Stretch => dynamic.resize_exact(width, height, FilterType::Triangle),
        FitMode::CropCenter => dynamic.resize_to_fill(width, height, FilterType::Triangle),
    };
    fitted.into_rgb8()
}

/// Blend every pixel toward a single color by a percentage
///
/// A percent of 0 leaves the image untouched; 100 floods it with the
/// color. Values above 100 saturate.
pub fn blend_toward(image: &mut RgbImage, color: Rgb, percent: u8) {
    let alpha = f64::from(percent.min(100)) / 100.0;
    if alpha <= 0.0 {
        return;
    }
    let inverse = 1.0 - alpha;
    for pixel in image.pixels_mut() {
        let [r, g, b] = pixel.0;
        pixel.0 = [
            blend_channel(r, color.r, inverse, alpha),
            blend_channel(g, color.g, inverse, alpha),
            blend_channel(b, color.b, inverse, alpha),
        ];
    }
}

fn blend_channel(from: u8, to: u8, inverse: f64, alpha: f64) -> u8 {
    f64::from(to)
        .mul_add(alpha, f64::from(from) * inverse)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Gaussian-blurred copy used as the reference overlay
pub fn blurred_copy(image: &RgbImage, sigma: f32) -> RgbImage {
    image::imageops::blur(image, sigma)
}

/// Save an image, creating parent directories as needed
///
/// # Errors
///
/// Returns [`MosaicError::FileSystem`] when the parent directory cannot be
/// created and [`MosaicError::ImageExport`] when encoding fails.
pub fn save_image(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| MosaicError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source,
            })?;
        }
    }
    image.save(path).map_err(|source| MosaicError::ImageExport {
        path: path.to_path_buf(),
        source,
    })
}
