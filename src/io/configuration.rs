//! Engine constants and runtime configuration defaults

/// Millimeters per inch, for cell-size conversion
pub const MM_PER_INCH: f64 = 25.4;

/// Pixel step used when sparse-sampling average colors
///
/// Accuracy is intentionally traded for speed: only every Nth pixel in
/// each axis contributes to an average.
pub const COLOR_SAMPLE_STRIDE: u32 = 4;

/// Default number of top-ranked candidates the matcher chooses among
pub const DEFAULT_CANDIDATES_CONSIDERED: usize = 5;

/// Smallest allowed matcher shortlist size
pub const MIN_CANDIDATES_CONSIDERED: usize = 1;

/// Largest allowed matcher shortlist size
pub const MAX_CANDIDATES_CONSIDERED: usize = 20;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output dimension in pixels
pub const MAX_OUTPUT_DIMENSION: u32 = 30_000;

/// Gaussian sigma for the blurred reference overlay image
pub const REFERENCE_BLUR_SIGMA: f32 = 8.0;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default print width in inches
pub const DEFAULT_PRINT_WIDTH_IN: f64 = 24.0;

/// Default print height in inches
pub const DEFAULT_PRINT_HEIGHT_IN: f64 = 18.0;

/// Default print resolution in pixels per inch
pub const DEFAULT_RESOLUTION_PPI: u32 = 150;

/// Default mosaic cell size in millimeters
pub const DEFAULT_CELL_SIZE_MM: f64 = 15.0;

// Output settings
/// Suffix added to the rendered mosaic filename
pub const MOSAIC_SUFFIX: &str = "_mosaic";

/// Suffix added to the blurred reference overlay filename
pub const REFERENCE_SUFFIX: &str = "_reference";

/// Suffix added to the usage report filename
pub const REPORT_SUFFIX: &str = "_usage";
