//! Command-line interface for generating photo mosaics

use crate::algorithm::executor::{GenerationSummary, MosaicEngine, MosaicRequest, RunStatus};
use crate::analysis::cache::PhotoSource;
use crate::io::configuration::{
    DEFAULT_CANDIDATES_CONSIDERED, DEFAULT_CELL_SIZE_MM, DEFAULT_PRINT_HEIGHT_IN,
    DEFAULT_PRINT_WIDTH_IN, DEFAULT_RESOLUTION_PPI, DEFAULT_SEED,
};
use crate::io::error::{MosaicError, Result, configuration_error};
use crate::io::image::{FitMode, probe_orientation};
use crate::io::progress::ConsoleProgress;
use crate::spatial::grid::{CellSettings, CellShape, PrintSettings};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "photomosaic")]
#[command(
    author,
    version,
    about = "Generate a grid-tiled photo mosaic of a target image"
)]
/// Command-line arguments for the mosaic generator
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Target image the mosaic approximates
    #[arg(value_name = "PRIMARY")]
    pub primary: PathBuf,

    /// Directory containing the candidate photo library
    #[arg(value_name = "LIBRARY")]
    pub library: PathBuf,

    /// Print width in inches
    #[arg(long, default_value_t = DEFAULT_PRINT_WIDTH_IN)]
    pub width: f64,

    /// Print height in inches
    #[arg(long, default_value_t = DEFAULT_PRINT_HEIGHT_IN)]
    pub height: f64,

    /// Print resolution in pixels per inch
    #[arg(short, long, default_value_t = DEFAULT_RESOLUTION_PPI)]
    pub resolution: u32,

    /// Cell size in millimeters
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE_MM)]
    pub cell_size: f64,

    /// Cell shape ratio: square, 4:3, or 3:2
    #[arg(long, default_value = "4:3")]
    pub cell_shape: String,

    /// Tiling pattern: Square, Landscape, Portrait, or "Parquet <N>L <M>P"
    #[arg(short, long, default_value = "square")]
    pub pattern: String,

    /// Stretch photos into cells instead of center-cropping
    #[arg(long)]
    pub stretch: bool,

    /// Shrink the print to the target image's aspect ratio
    #[arg(long)]
    pub preserve_aspect: bool,

    /// Blend each tile toward its target color by this percent
    #[arg(short, long, default_value_t = 0)]
    pub blend: u8,

    /// Minimum grid distance between reuses of one photo
    #[arg(long)]
    pub spacing: Option<u32>,

    /// Number of top-ranked candidates to choose among
    #[arg(long, default_value_t = DEFAULT_CANDIDATES_CONSIDERED)]
    pub candidates: usize,

    /// Try to use every library photo at least once
    #[arg(short, long)]
    pub use_all: bool,

    /// Write a CSV usage report alongside the mosaic
    #[arg(long)]
    pub report: bool,

    /// Override the per-photo use limit
    #[arg(short, long)]
    pub max_uses: Option<u32>,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output directory (defaults to the primary image's directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Drives one generation run from CLI arguments
pub struct MosaicRunner {
    cli: Cli,
}

impl MosaicRunner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Collect the library, run the engine, and print the outcome
    ///
    /// # Errors
    ///
    /// Returns an error when the library directory cannot be read, the
    /// settings fail validation, or the run itself fails.
    pub fn process(self) -> Result<()> {
        let photos = self.collect_photos()?;
        let request = self.build_request(photos)?;

        let console = self.cli.should_show_progress().then(ConsoleProgress::new);
        let mut engine = MosaicEngine::new(request);
        if let Some(bar) = console.clone() {
            engine = engine.with_progress(Box::new(move |percent, label| {
                bar.update(percent, label);
            }));
        }

        let summary = engine.generate();
        if let Some(bar) = console {
            bar.finish();
        }

        self.print_warnings(&summary.warnings);
        match summary.status {
            RunStatus::Complete => {
                self.print_summary(&summary);
                Ok(())
            }
            RunStatus::Cancelled => {
                self.print_cancelled();
                Ok(())
            }
            RunStatus::Failed => Err(MosaicError::RunFailed {
                message: summary
                    .error
                    .unwrap_or_else(|| String::from("unknown failure")),
            }),
        }
    }

    // Allow print for user feedback on unreadable candidates
    #[allow(clippy::print_stderr)]
    fn collect_photos(&self) -> Result<Vec<PhotoSource>> {
        if !self.cli.library.is_dir() {
            return Err(configuration_error(
                "photo library",
                &format!("'{}' is not a directory", self.cli.library.display()),
            ));
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(&self.cli.library)? {
            let path = entry?.path();
            if is_supported_photo(&path) {
                files.push(path);
            }
        }
        files.sort();

        let mut photos = Vec::with_capacity(files.len());
        for path in files {
            match probe_orientation(&path) {
                Ok(orientation) => photos.push(PhotoSource { path, orientation }),
                Err(err) => {
                    if !self.cli.quiet {
                        eprintln!("Ignoring unreadable photo: {err}");
                    }
                }
            }
        }
        Ok(photos)
    }

    fn build_request(&self, photos: Vec<PhotoSource>) -> Result<MosaicRequest> {
        let shape = CellShape::parse(&self.cli.cell_shape)?;
        let output_dir = self.cli.output.clone().unwrap_or_else(|| {
            self.cli
                .primary
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });

        Ok(MosaicRequest {
            primary_image: self.cli.primary.clone(),
            photos,
            print: PrintSettings {
                width_in: self.cli.width,
                height_in: self.cli.height,
                resolution: self.cli.resolution,
            },
            cell: CellSettings {
                size_mm: self.cli.cell_size,
                shape,
            },
            fit: if self.cli.stretch {
                FitMode::Stretch
            } else {
                FitMode::CropCenter
            },
            pattern: self.cli.pattern.clone(),
            preserve_aspect: self.cli.preserve_aspect,
            color_blend_percent: self.cli.blend,
            duplicate_spacing: self.cli.spacing,
            candidates_considered: self.cli.candidates,
            use_all_images: self.cli.use_all,
            write_report: self.cli.report,
            max_uses_override: self.cli.max_uses,
            output_dir,
            seed: self.cli.seed,
        })
    }

    // Allow print for user feedback on skipped photos
    #[allow(clippy::print_stderr)]
    fn print_warnings(&self, warnings: &[String]) {
        if self.cli.quiet {
            return;
        }
        for warning in warnings {
            eprintln!("{warning}");
        }
    }

    // Allow print for the final run summary
    #[allow(clippy::print_stderr)]
    fn print_summary(&self, summary: &GenerationSummary) {
        if self.cli.quiet {
            return;
        }
        eprintln!(
            "Mosaic: {} cells ({}x{} grid, {}x{} px), {} of {} photos used, {} cells filled in {:.1?}",
            summary.placements_total,
            summary.rows,
            summary.cols,
            summary.output_width,
            summary.output_height,
            summary.distinct_photos_used,
            summary.cached_photos,
            summary.placements_filled,
            summary.elapsed,
        );
        if let Some(path) = &summary.mosaic_path {
            eprintln!("Saved: {}", path.display());
        }
        if let Some(path) = &summary.report_path {
            eprintln!("Report: {}", path.display());
        }
    }

    // Allow print for the cancellation notice
    #[allow(clippy::print_stderr)]
    fn print_cancelled(&self) {
        if !self.cli.quiet {
            eprintln!("Generation cancelled");
        }
    }
}

fn is_supported_photo(path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|extension| extension.to_str()) else {
        return false;
    };
    matches!(
        extension.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_photo_extensions_are_case_insensitive() {
        assert!(is_supported_photo(Path::new("a.PNG")));
        assert!(is_supported_photo(Path::new("b.jpeg")));
        assert!(is_supported_photo(Path::new("c.Jpg")));
        assert!(!is_supported_photo(Path::new("d.gif")));
        assert!(!is_supported_photo(Path::new("noext")));
    }
}
