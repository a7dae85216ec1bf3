//! Generation-free planning: cell counts, photo counts, and use limits

use crate::spatial::grid::GridDimensions;
use crate::spatial::parquet::ParquetTiler;
use crate::spatial::pattern::{Orientation, PatternInfo, PatternKind};

/// Photo tallies by aspect classification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrientationCounts {
    /// Photos wider than tall
    pub landscape: usize,
    /// Photos taller than wide
    pub portrait: usize,
    /// Photos with equal sides
    pub square: usize,
}

impl OrientationCounts {
    /// Tally an orientation stream
    pub fn tally(orientations: impl Iterator<Item = Orientation>) -> Self {
        let mut counts = Self::default();
        for orientation in orientations {
            match orientation {
                Orientation::Landscape => counts.landscape += 1,
                Orientation::Portrait => counts.portrait += 1,
                Orientation::Square => counts.square += 1,
            }
        }
        counts
    }

    /// Total photos counted
    pub const fn total(&self) -> usize {
        self.landscape + self.portrait + self.square
    }

    /// Photos that can appear somewhere in the given pattern
    pub const fn eligible(&self, pattern: PatternInfo) -> usize {
        match pattern.kind {
            PatternKind::LandscapeOnly => self.landscape + self.square,
            PatternKind::PortraitOnly => self.portrait + self.square,
            PatternKind::Square | PatternKind::Parquet { .. } => self.total(),
        }
    }
}

/// Cell and photo counts for a prospective mosaic, with a recommended
/// per-photo use limit
#[derive(Clone, Copy, Debug)]
pub struct MosaicPlan {
    /// Total placements the pattern will produce
    pub total_cells: usize,
    /// Placements that strictly require a landscape-capable photo
    pub landscape_cells: usize,
    /// Placements that strictly require a portrait-capable photo
    pub portrait_cells: usize,
    /// Available photos by orientation
    pub photo_counts: OrientationCounts,
    /// Suggested max-uses-per-photo so the library covers the grid
    pub recommended_max_uses: u32,
}

/// Derive the plan for a grid, pattern, and photo library
pub fn build_plan(
    grid: &GridDimensions,
    pattern: PatternInfo,
    photo_counts: OrientationCounts,
) -> MosaicPlan {
    let (total_cells, landscape_cells, portrait_cells) = match pattern.kind {
        PatternKind::Parquet {
            landscape,
            portrait,
        } => {
            let tiler = ParquetTiler::new(grid, landscape, portrait);
            let (visible_landscape, visible_portrait) = tiler.visible_counts();
            (
                visible_landscape + visible_portrait,
                visible_landscape,
                visible_portrait,
            )
        }
        PatternKind::LandscapeOnly => {
            let cells = (grid.rows * grid.cols) as usize;
            (cells, cells, 0)
        }
        PatternKind::PortraitOnly => {
            let cells = (grid.rows * grid.cols) as usize;
            (cells, 0, cells)
        }
        PatternKind::Square => ((grid.rows * grid.cols) as usize, 0, 0),
    };

    let eligible = photo_counts.eligible(pattern);
    let recommended_max_uses = if eligible == 0 {
        total_cells.max(1) as u32
    } else {
        (total_cells.div_ceil(eligible)).max(1) as u32
    };

    MosaicPlan {
        total_cells,
        landscape_cells,
        portrait_cells,
        photo_counts,
        recommended_max_uses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: u32, cols: u32) -> GridDimensions {
        GridDimensions {
            output_width: cols * 100,
            output_height: rows * 100,
            unit_size: 100,
            landscape_cell: (100, 100),
            portrait_cell: (100, 100),
            rows,
            cols,
            unit_rows: rows,
            unit_cols: cols,
        }
    }

    fn square_pattern() -> PatternInfo {
        PatternInfo {
            kind: PatternKind::Square,
        }
    }

    #[test]
    fn recommended_uses_cover_the_grid() {
        let counts = OrientationCounts {
            landscape: 3,
            portrait: 2,
            square: 0,
        };
        let plan = build_plan(&grid(4, 5), square_pattern(), counts);
        assert_eq!(plan.total_cells, 20);
        assert_eq!(plan.recommended_max_uses, 4);
    }

    #[test]
    fn exact_coverage_needs_a_single_use() {
        let counts = OrientationCounts {
            landscape: 20,
            portrait: 0,
            square: 0,
        };
        let plan = build_plan(&grid(4, 5), square_pattern(), counts);
        assert_eq!(plan.recommended_max_uses, 1);
    }

    #[test]
    fn orientation_patterns_only_count_eligible_photos() {
        let counts = OrientationCounts {
            landscape: 1,
            portrait: 7,
            square: 1,
        };
        let pattern = PatternInfo {
            kind: PatternKind::LandscapeOnly,
        };
        assert_eq!(counts.eligible(pattern), 2);
        let plan = build_plan(&grid(2, 5), pattern, counts);
        assert_eq!(plan.landscape_cells, 10);
        assert_eq!(plan.recommended_max_uses, 5);
    }

    #[test]
    fn empty_libraries_do_not_divide_by_zero() {
        let plan = build_plan(&grid(2, 2), square_pattern(), OrientationCounts::default());
        assert_eq!(plan.recommended_max_uses, 4);
    }
}
