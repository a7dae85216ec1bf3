//! Interleaved parquet tiling of landscape and portrait cells
//!
//! Tiling rows repeat a sequence built from the pattern's landscape:portrait
//! ratio (2:1 gives `[L, L, P]`). Each row starts one portrait-width further
//! left than the previous, and every placed portrait lowers the baseline by
//! `delta = h_P - h_L` so its bottom edge realigns with the landscape
//! baseline; together these produce the diagonal brick offset. Padding on
//! the top and left guarantees the cursor never goes negative, and the same
//! deterministic layout is used both for planning counts and for placement
//! generation, so the two can never diverge.

use crate::spatial::grid::GridDimensions;
use crate::spatial::occupancy::OccupancyGrid;
use crate::spatial::pattern::RequiredOrientation;

// Interlocking paddings depend on each other; the fixed-point loop below
// is bounded well past observed convergence (two or three rounds).
const PADDING_ITERATION_LIMIT: usize = 32;

/// One accepted cell of the parquet layout, in canvas unit coordinates
///
/// Cells in the padding zone carry negative or past-edge coordinates and
/// are marked invisible; they claim occupancy but never consume a photo.
#[derive(Clone, Copy, Debug)]
pub struct ParquetCell {
    /// Topmost unit row, relative to the canvas (may be negative)
    pub unit_row: i64,
    /// Leftmost unit column, relative to the canvas (may be negative)
    pub unit_col: i64,
    /// Width in units
    pub width_units: u32,
    /// Height in units
    pub height_units: u32,
    /// Cell orientation within the tiling sequence
    pub orientation: RequiredOrientation,
    /// Whether the cell's rectangle intersects the visible canvas
    pub visible: bool,
}

/// Deterministic parquet layout engine for one grid
#[derive(Clone, Debug)]
pub struct ParquetTiler {
    landscape: (u32, u32),
    portrait: (u32, u32),
    landscape_ratio: u32,
    portrait_ratio: u32,
    unit_rows: usize,
    unit_cols: usize,
    delta: usize,
    top_padding: usize,
    left_padding: usize,
    row_count: usize,
    padded_rows: usize,
    padded_cols: usize,
}

impl ParquetTiler {
    /// Build a tiler for the grid's unit footprints and a repeat ratio
    pub fn new(grid: &GridDimensions, landscape_ratio: u32, portrait_ratio: u32) -> Self {
        let landscape = grid.landscape_units();
        let portrait = grid.portrait_units();
        let unit_rows = grid.unit_rows as usize;
        let unit_cols = grid.unit_cols as usize;

        let (w_l, h_l) = (landscape.0 as usize, landscape.1 as usize);
        let (w_p, h_p) = (portrait.0 as usize, portrait.1 as usize);
        let delta = h_p.saturating_sub(h_l);
        let cycle_width = (landscape_ratio as usize * w_l) + (portrait_ratio as usize * w_p);

        // topPadding = delta * (portraitRatio * cyclesAcrossRow) and
        // leftPadding = w_P * rowCount are mutually recursive through the
        // row walk length; iterate to the fixed point.
        let mut top_padding = 0usize;
        let mut rounds = 0usize;
        let (row_count, left_padding) = loop {
            let rows = (unit_rows + top_padding) / h_l.max(1) + 1;
            let left = w_p * rows;
            let cycles_across_row = (left + unit_cols) / cycle_width.max(1) + 1;
            let next = delta * (portrait_ratio as usize * cycles_across_row);
            rounds += 1;
            if next == top_padding || rounds >= PADDING_ITERATION_LIMIT {
                break (rows, left);
            }
            top_padding = next;
        };

        let padded_rows = top_padding + row_count * h_l + h_p;
        let padded_cols = left_padding + unit_cols + w_l.max(w_p);

        Self {
            landscape,
            portrait,
            landscape_ratio,
            portrait_ratio,
            unit_rows,
            unit_cols,
            delta,
            top_padding,
            left_padding,
            row_count,
            padded_rows,
            padded_cols,
        }
    }

    /// Units of top padding above the canvas
    pub const fn top_padding(&self) -> usize {
        self.top_padding
    }

    /// Units of left padding before the canvas
    pub const fn left_padding(&self) -> usize {
        self.left_padding
    }

    /// Padded occupancy grid dimensions (rows, cols)
    pub const fn padded_dimensions(&self) -> (usize, usize) {
        (self.padded_rows, self.padded_cols)
    }

    /// Compute every accepted cell of the layout
    ///
    /// Deterministic for a given tiler; the occupancy grid guarantees no
    /// two accepted cells overlap in unit space.
    pub fn layout(&self) -> Vec<ParquetCell> {
        let mut occupancy = OccupancyGrid::new(self.padded_rows, self.padded_cols);
        let sequence = self.sequence();
        let h_l = self.landscape.1 as usize;
        let w_p = self.portrait.0 as usize;

        let mut cells = Vec::new();
        for r in 0..self.row_count {
            let mut y = r * h_l;
            let mut x = self.left_padding - r * w_p;
            let mut element = 0usize;

            while x < self.padded_cols {
                let Some(&(width, height, orientation)) = sequence.get(element % sequence.len())
                else {
                    break;
                };
                let (w, h) = (width as usize, height as usize);
                if occupancy.claim_rect(y, x, h, w) {
                    cells.push(self.cell_at(y, x, width, height, orientation));
                    x += w;
                    if orientation == RequiredOrientation::Portrait {
                        y += self.delta;
                    }
                    element += 1;
                } else {
                    // Blocked by a neighbouring row's overhang or the grid
                    // edge; slide one unit and retry the same element.
                    x += 1;
                }
            }
        }
        cells
    }

    /// Visible landscape and portrait cell counts, in lockstep with
    /// [`Self::layout`]
    pub fn visible_counts(&self) -> (usize, usize) {
        let mut landscape = 0;
        let mut portrait = 0;
        for cell in self.layout() {
            if cell.visible {
                match cell.orientation {
                    RequiredOrientation::Portrait => portrait += 1,
                    _ => landscape += 1,
                }
            }
        }
        (landscape, portrait)
    }

    fn sequence(&self) -> Vec<(u32, u32, RequiredOrientation)> {
        let mut sequence = Vec::with_capacity((self.landscape_ratio + self.portrait_ratio) as usize);
        for _ in 0..self.landscape_ratio {
            sequence.push((
                self.landscape.0,
                self.landscape.1,
                RequiredOrientation::Landscape,
            ));
        }
        for _ in 0..self.portrait_ratio {
            sequence.push((
                self.portrait.0,
                self.portrait.1,
                RequiredOrientation::Portrait,
            ));
        }
        sequence
    }

    fn cell_at(
        &self,
        padded_row: usize,
        padded_col: usize,
        width: u32,
        height: u32,
        orientation: RequiredOrientation,
    ) -> ParquetCell {
        let unit_row = padded_row as i64 - self.top_padding as i64;
        let unit_col = padded_col as i64 - self.left_padding as i64;
        let visible = unit_row + i64::from(height) > 0
            && unit_row < self.unit_rows as i64
            && unit_col + i64::from(width) > 0
            && unit_col < self.unit_cols as i64;
        ParquetCell {
            unit_row,
            unit_col,
            width_units: width,
            height_units: height,
            orientation,
            visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid_with_units(land: (u32, u32), unit_rows: u32, unit_cols: u32) -> GridDimensions {
        let unit = 25;
        GridDimensions {
            output_width: unit_cols * unit,
            output_height: unit_rows * unit,
            unit_size: unit,
            landscape_cell: (land.0 * unit, land.1 * unit),
            portrait_cell: (land.1 * unit, land.0 * unit),
            rows: (unit_rows / land.1).max(1),
            cols: (unit_cols / land.0).max(1),
            unit_rows,
            unit_cols,
        }
    }

    // Rebuilds occupancy from the emitted cells; every claim succeeding
    // proves the layout never produced overlapping rectangles.
    fn assert_disjoint(tiler: &ParquetTiler, cells: &[ParquetCell]) {
        let (rows, cols) = tiler.padded_dimensions();
        let mut check = OccupancyGrid::new(rows, cols);
        for cell in cells {
            let row = cell.unit_row + tiler.top_padding() as i64;
            let col = cell.unit_col + tiler.left_padding() as i64;
            assert!(row >= 0 && col >= 0, "padding let a cursor go negative");
            assert!(
                check.claim_rect(
                    row as usize,
                    col as usize,
                    cell.height_units as usize,
                    cell.width_units as usize,
                ),
                "overlapping or out-of-bounds cell at ({row}, {col})"
            );
        }
    }

    #[test]
    fn two_to_one_ratio_carries_into_visible_counts() {
        let grid = grid_with_units((4, 3), 64, 80);
        let tiler = ParquetTiler::new(&grid, 2, 1);
        let (landscape, portrait) = tiler.visible_counts();
        assert!(landscape > 0 && portrait > 0);
        let ratio = landscape as f64 / portrait as f64;
        assert!(
            (1.5..=2.5).contains(&ratio),
            "expected roughly 2:1, got {landscape}:{portrait}"
        );
    }

    #[test]
    fn padding_prevents_out_of_bounds_writes() {
        let grid = grid_with_units((4, 3), 64, 80);
        let tiler = ParquetTiler::new(&grid, 2, 1);
        let cells = tiler.layout();
        assert!(!cells.is_empty());
        assert_disjoint(&tiler, &cells);
    }

    #[test]
    fn counting_and_generation_stay_in_lockstep() {
        let grid = grid_with_units((4, 3), 40, 52);
        let tiler = ParquetTiler::new(&grid, 1, 1);
        let (landscape, portrait) = tiler.visible_counts();
        let visible = tiler.layout().iter().filter(|c| c.visible).count();
        assert_eq!(landscape + portrait, visible);
    }

    #[test]
    fn random_ratios_and_grids_never_overlap() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..12 {
            let land = if rng.random_range(0..2) == 0 {
                (4, 3)
            } else {
                (3, 2)
            };
            let unit_rows = rng.random_range(12..70);
            let unit_cols = rng.random_range(12..90);
            let landscape_ratio = rng.random_range(1..5);
            let portrait_ratio = rng.random_range(1..4);
            let grid = grid_with_units(land, unit_rows, unit_cols);
            let tiler = ParquetTiler::new(&grid, landscape_ratio, portrait_ratio);
            let cells = tiler.layout();
            assert_disjoint(&tiler, &cells);
            let visible = cells.iter().filter(|c| c.visible).count();
            assert!(visible > 0, "no visible cells for {unit_rows}x{unit_cols}");
        }
    }

    #[test]
    fn visible_cells_intersect_the_canvas() {
        let grid = grid_with_units((3, 2), 30, 30);
        let tiler = ParquetTiler::new(&grid, 1, 2);
        for cell in tiler.layout() {
            let intersects = cell.unit_row < i64::from(grid.unit_rows)
                && cell.unit_row + i64::from(cell.height_units) > 0
                && cell.unit_col < i64::from(grid.unit_cols)
                && cell.unit_col + i64::from(cell.width_units) > 0;
            assert_eq!(cell.visible, intersects);
        }
    }
}
