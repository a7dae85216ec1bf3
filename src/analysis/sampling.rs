//! Sparse color sampling of images and image regions
//!
//! Averages are computed from every Nth pixel rather than a full scan;
//! accuracy is intentionally sacrificed for speed. Region sampling clamps
//! coordinates, so rectangles that hang past an image edge reuse the edge
//! pixels instead of failing.

use crate::io::configuration::COLOR_SAMPLE_STRIDE;
use crate::math::color::{QuadrantSignature, Rgb};
use image::RgbImage;

/// Sparse-sampled average color of a whole image
pub fn average_color(image: &RgbImage) -> Rgb {
    region_average(image, 0, 0, image.width(), image.height())
}

/// Sparse-sampled average color of a pixel rectangle
///
/// Sample coordinates are clamped to the image bounds; degenerate
/// rectangles collapse to a single clamped sample.
pub fn region_average(image: &RgbImage, x: i64, y: i64, width: u32, height: u32) -> Rgb {
    if image.width() == 0 || image.height() == 0 {
        return Rgb::default();
    }

    let mut sum_r = 0u64;
    let mut sum_g = 0u64;
    let mut sum_b = 0u64;
    let mut samples = 0u64;
    let stride = COLOR_SAMPLE_STRIDE as usize;

    for dy in (0..height.max(1)).step_by(stride.max(1)) {
        let py = clamp_axis(y + i64::from(dy), image.height());
        for dx in (0..width.max(1)).step_by(stride.max(1)) {
            let px = clamp_axis(x + i64::from(dx), image.width());
            let pixel = image.get_pixel(px, py).0;
            sum_r += u64::from(pixel[0]);
            sum_g += u64::from(pixel[1]);
            sum_b += u64::from(pixel[2]);
            samples += 1;
        }
    }

    Rgb::new(
        (sum_r / samples) as u8,
        (sum_g / samples) as u8,
        (sum_b / samples) as u8,
    )
}

/// Quadrant signature of a whole image
pub fn quadrant_signature(image: &RgbImage) -> QuadrantSignature {
    region_signature(image, 0, 0, image.width(), image.height())
}

/// Quadrant signature of a pixel rectangle, quarters ordered TL, TR, BL, BR
pub fn region_signature(
    image: &RgbImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
) -> QuadrantSignature {
    let half_w = (width / 2).max(1);
    let half_h = (height / 2).max(1);
    let right = x + i64::from(half_w);
    let bottom = y + i64::from(half_h);
    let right_w = width.saturating_sub(half_w).max(1);
    let bottom_h = height.saturating_sub(half_h).max(1);

    QuadrantSignature::new([
        region_average(image, x, y, half_w, half_h),
        region_average(image, right, y, right_w, half_h),
        region_average(image, x, bottom, half_w, bottom_h),
        region_average(image, right, bottom, right_w, bottom_h),
    ])
}

fn clamp_axis(coordinate: i64, extent: u32) -> u32 {
    coordinate.clamp(0, i64::from(extent) - 1) as u32
}
