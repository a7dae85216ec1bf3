//! Pixel grid derivation from print size, resolution, and cell settings
//!
//! The planner orients the print rectangle to the primary image, optionally
//! shrinks it to preserve the image aspect ratio, converts everything to
//! pixels, and floors the print area into whole cells. For parquet the grid
//! is expressed in gcd-sized units shared by both cell footprints.

use crate::io::configuration::{MAX_OUTPUT_DIMENSION, MM_PER_INCH};
use crate::io::error::{Result, configuration_error};
use crate::spatial::pattern::{PatternInfo, PatternKind};

/// Physical print settings for a generation run
#[derive(Clone, Copy, Debug)]
pub struct PrintSettings {
    /// Print width in inches
    pub width_in: f64,
    /// Print height in inches
    pub height_in: f64,
    /// Print resolution in pixels per inch
    pub resolution: u32,
}

/// Aspect ratio of a landscape cell footprint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellShape {
    /// 1:1 cells
    Square,
    /// 4:3 cells
    FourByThree,
    /// 3:2 cells
    ThreeByTwo,
}

impl CellShape {
    /// Parse a shape from its conventional notation
    ///
    /// # Errors
    ///
    /// Returns a configuration error for anything other than `square`,
    /// `4:3`, or `3:2`.
    pub fn parse(text: &str) -> Result<Self> {
        match text.to_ascii_lowercase().as_str() {
            "square" | "1:1" => Ok(Self::Square),
            "4:3" => Ok(Self::FourByThree),
            "3:2" => Ok(Self::ThreeByTwo),
            other => Err(configuration_error(
                "cell shape",
                &format!("expected 'square', '4:3', or '3:2', found '{other}'"),
            )),
        }
    }
}

/// Mosaic cell settings for a generation run
#[derive(Clone, Copy, Debug)]
pub struct CellSettings {
    /// Cell size (landscape width) in millimeters
    pub size_mm: f64,
    /// Aspect ratio of the landscape cell footprint
    pub shape: CellShape,
}

/// Derived pixel geometry for one mosaic
///
/// Invariant: every dimension and count is at least 1.
#[derive(Clone, Copy, Debug)]
pub struct GridDimensions {
    /// Output image width in pixels
    pub output_width: u32,
    /// Output image height in pixels
    pub output_height: u32,
    /// Base unit pixel size, the gcd of the landscape cell sides
    pub unit_size: u32,
    /// Landscape cell footprint in pixels (width, height)
    pub landscape_cell: (u32, u32),
    /// Portrait cell footprint in pixels (width, height)
    pub portrait_cell: (u32, u32),
    /// Cell rows in the output grid
    pub rows: u32,
    /// Cell columns in the output grid
    pub cols: u32,
    /// Unit rows covering the output canvas
    pub unit_rows: u32,
    /// Unit columns covering the output canvas
    pub unit_cols: u32,
}

impl GridDimensions {
    /// Cell footprint used by uniform-grid placements of this pattern
    pub const fn active_cell(&self, pattern: PatternInfo) -> (u32, u32) {
        match pattern.kind {
            PatternKind::PortraitOnly => self.portrait_cell,
            _ => self.landscape_cell,
        }
    }

    /// Landscape cell footprint in units (width, height)
    pub const fn landscape_units(&self) -> (u32, u32) {
        (
            self.landscape_cell.0 / self.unit_size,
            self.landscape_cell.1 / self.unit_size,
        )
    }

    /// Portrait cell footprint in units (width, height)
    pub const fn portrait_units(&self) -> (u32, u32) {
        (
            self.portrait_cell.0 / self.unit_size,
            self.portrait_cell.1 / self.unit_size,
        )
    }
}

/// Derive the pixel grid for a run
///
/// The print rectangle is first oriented so its long side matches the
/// primary image's long side. In aspect-preserving mode one print
/// dimension then shrinks to match the image; otherwise the image is later
/// crop-filled into the full rectangle. All divisions floor and every
/// output dimension clamps to a minimum of 1.
///
/// # Errors
///
/// Returns a configuration error when the print size, resolution, or cell
/// size is not positive, or when the output would exceed
/// [`MAX_OUTPUT_DIMENSION`].
pub fn plan_grid(
    print: PrintSettings,
    cell: CellSettings,
    primary_dimensions: (u32, u32),
    pattern: PatternInfo,
    preserve_aspect: bool,
) -> Result<GridDimensions> {
    if print.width_in <= 0.0 || print.height_in <= 0.0 {
        return Err(configuration_error(
            "print size",
            &"width and height must be positive",
        ));
    }
    if print.resolution == 0 {
        return Err(configuration_error("resolution", &"must be at least 1"));
    }
    if cell.size_mm <= 0.0 {
        return Err(configuration_error("cell size", &"must be positive"));
    }

    let (primary_w, primary_h) = primary_dimensions;
    let long = print.width_in.max(print.height_in);
    let short = print.width_in.min(print.height_in);
    let (mut print_w, mut print_h) = if primary_w >= primary_h {
        (long, short)
    } else {
        (short, long)
    };

    if preserve_aspect && primary_w >= 1 && primary_h >= 1 {
        let aspect = f64::from(primary_w) / f64::from(primary_h);
        if print_w / print_h > aspect {
            print_w = print_h * aspect;
        } else {
            print_h = print_w / aspect;
        }
    }

    let resolution = f64::from(print.resolution);
    let canvas_w = ((print_w * resolution).floor() as u32).max(1);
    let canvas_h = ((print_h * resolution).floor() as u32).max(1);
    if canvas_w > MAX_OUTPUT_DIMENSION || canvas_h > MAX_OUTPUT_DIMENSION {
        return Err(configuration_error(
            "print size",
            &format!("output would exceed {MAX_OUTPUT_DIMENSION} pixels per side"),
        ));
    }

    let cell_px = (((cell.size_mm / MM_PER_INCH) * resolution).floor() as u32).max(1);
    let shape = effective_shape(cell.shape, pattern);
    let landscape_cell = landscape_footprint(cell_px, shape);
    let portrait_cell = (landscape_cell.1, landscape_cell.0);
    let unit_size = gcd(landscape_cell.0, landscape_cell.1);

    let (active_w, active_h) = match pattern.kind {
        PatternKind::PortraitOnly => portrait_cell,
        _ => landscape_cell,
    };
    let rows = (canvas_h / active_h).max(1);
    let cols = (canvas_w / active_w).max(1);

    let (output_width, output_height, unit_rows, unit_cols) = if pattern.is_parquet() {
        let unit_cols = (canvas_w / unit_size).max(1);
        let unit_rows = (canvas_h / unit_size).max(1);
        (
            unit_cols * unit_size,
            unit_rows * unit_size,
            unit_rows,
            unit_cols,
        )
    } else {
        let output_width = cols * active_w;
        let output_height = rows * active_h;
        (
            output_width,
            output_height,
            (output_height / unit_size).max(1),
            (output_width / unit_size).max(1),
        )
    };

    Ok(GridDimensions {
        output_width,
        output_height,
        unit_size,
        landscape_cell,
        portrait_cell,
        rows,
        cols,
        unit_rows,
        unit_cols,
    })
}

// Parquet needs distinct landscape and portrait footprints to interlock,
// so a square shape is promoted to 4:3. The square pattern always uses
// square cells regardless of the configured shape.
const fn effective_shape(shape: CellShape, pattern: PatternInfo) -> CellShape {
    match pattern.kind {
        PatternKind::Square => CellShape::Square,
        PatternKind::Parquet { .. } => match shape {
            CellShape::Square => CellShape::FourByThree,
            other => other,
        },
        _ => shape,
    }
}

const fn landscape_footprint(cell_px: u32, shape: CellShape) -> (u32, u32) {
    let height = match shape {
        CellShape::Square => cell_px,
        CellShape::FourByThree => cell_px * 3 / 4,
        CellShape::ThreeByTwo => cell_px * 2 / 3,
    };
    (cell_px, if height == 0 { 1 } else { height })
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    if a == 0 { 1 } else { a }
}
