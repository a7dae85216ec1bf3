//! Target cell enumeration: positions, footprints, and sampled colors
//!
//! Uniform patterns enumerate row-major grid cells; parquet placements come
//! from the tiler's visible cells. Either way each placement carries the
//! target colors sampled from the prepared primary image, so the matcher
//! never touches pixels again.

use crate::analysis::sampling::{region_average, region_signature};
use crate::math::color::{QuadrantSignature, Rgb};
use crate::spatial::grid::GridDimensions;
use crate::spatial::parquet::ParquetTiler;
use crate::spatial::pattern::{PatternInfo, PatternKind, RequiredOrientation};
use image::RgbImage;

/// One target cell awaiting a photo
///
/// Created per cell and consumed once by the matcher. Parquet edge cells
/// may carry a negative pixel origin; compositing clips them to the canvas.
#[derive(Clone, Debug)]
pub struct MosaicPlacement {
    /// Grid row (unit row for parquet; may be negative at parquet edges)
    pub row: i32,
    /// Grid column (unit column for parquet)
    pub col: i32,
    /// Pixel x of the cell origin
    pub x: i64,
    /// Pixel y of the cell origin
    pub y: i64,
    /// Cell width in pixels
    pub width: u32,
    /// Cell height in pixels
    pub height: u32,
    /// Orientation demanded from the filling photo
    pub required: RequiredOrientation,
    /// Sparse-sampled average color of the target patch
    pub target_average: Rgb,
    /// Quadrant signature of the target patch
    pub target_signature: QuadrantSignature,
}

/// Enumerate every placement of the pattern over the prepared image
pub fn plan_placements(
    grid: &GridDimensions,
    pattern: PatternInfo,
    prepared: &RgbImage,
) -> Vec<MosaicPlacement> {
    match pattern.kind {
        PatternKind::Parquet {
            landscape,
            portrait,
        } => parquet_placements(grid, landscape, portrait, prepared),
        _ => uniform_placements(grid, pattern, prepared),
    }
}

fn uniform_placements(
    grid: &GridDimensions,
    pattern: PatternInfo,
    prepared: &RgbImage,
) -> Vec<MosaicPlacement> {
    let (cell_w, cell_h) = grid.active_cell(pattern);
    let required = pattern.required_orientation();
    let mut placements = Vec::with_capacity((grid.rows * grid.cols) as usize);

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let x = i64::from(col) * i64::from(cell_w);
            let y = i64::from(row) * i64::from(cell_h);
            placements.push(placement_at(
                prepared,
                row as i32,
                col as i32,
                x,
                y,
                cell_w,
                cell_h,
                required,
            ));
        }
    }
    placements
}

fn parquet_placements(
    grid: &GridDimensions,
    landscape_ratio: u32,
    portrait_ratio: u32,
    prepared: &RgbImage,
) -> Vec<MosaicPlacement> {
    let tiler = ParquetTiler::new(grid, landscape_ratio, portrait_ratio);
    let unit = i64::from(grid.unit_size);

    tiler
        .layout()
        .into_iter()
        .filter(|cell| cell.visible)
        .map(|cell| {
            placement_at(
                prepared,
                cell.unit_row as i32,
                cell.unit_col as i32,
                cell.unit_col * unit,
                cell.unit_row * unit,
                cell.width_units * grid.unit_size,
                cell.height_units * grid.unit_size,
                cell.orientation,
            )
        })
        .collect()
}

fn placement_at(
    prepared: &RgbImage,
    row: i32,
    col: i32,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    required: RequiredOrientation,
) -> MosaicPlacement {
    MosaicPlacement {
        row,
        col,
        x,
        y,
        width,
        height,
        required,
        target_average: region_average(prepared, x, y, width, height),
        target_signature: region_signature(prepared, x, y, width, height),
    }
}
