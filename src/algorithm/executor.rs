//! Run orchestration: stage machine, cancellation, and result assembly
//!
//! A generation run walks a fixed stage sequence, reporting an integer
//! percent and a short label at every transition. Errors never escape
//! [`MosaicEngine::generate`]: failures become a populated error message
//! and cancellation becomes its own distinguished status.

use crate::algorithm::matcher::{UsageHistory, best_remaining_placement, find_best_match};
use crate::algorithm::placement::{MosaicPlacement, plan_placements};
use crate::analysis::cache::{CellPhotoCache, PhotoSource, cache_photo};
use crate::analysis::plan::{MosaicPlan, OrientationCounts, build_plan};
use crate::io::configuration::{
    MOSAIC_SUFFIX, REFERENCE_BLUR_SIGMA, REFERENCE_SUFFIX, REPORT_SUFFIX,
};
use crate::io::error::{MosaicError, Result, configuration_error};
use crate::io::image::{
    FitMode, blend_toward, blurred_copy, fit_to_cell, load_image, probe_dimensions, save_image,
};
use crate::io::report::write_usage_report;
use crate::spatial::grid::{CellSettings, PrintSettings, plan_grid};
use crate::spatial::pattern::PatternInfo;
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative cancellation flag shared with the caller
///
/// The engine polls the token between cache iterations and between
/// placement iterations; a long individual iteration is never interrupted
/// part-way.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unsignalled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation; takes effect at the engine's next checkpoint
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fail with [`MosaicError::Cancelled`] once the token is signalled
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::Cancelled`] after [`Self::cancel`] was called.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(MosaicError::Cancelled);
        }
        Ok(())
    }
}

/// Stages of a generation run, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Request validation before any expensive work
    Validating,
    /// Pattern descriptor parsing
    ResolvePattern,
    /// Primary image header probe
    VerifyPrimaryImage,
    /// Grid geometry derivation
    CalculateGrid,
    /// Primary image decode
    LoadPrimaryImage,
    /// Candidate photo analysis, interpolated per photo
    BuildCellCache,
    /// Cell/photo count planning
    BuildPlan,
    /// Primary image fitting and reference blur
    PreparePrimaryImage,
    /// Placement matching and compositing, interpolated per placement
    CreateMosaic,
    /// Mosaic and reference export
    SaveResults,
    /// Usage report export
    WriteReport,
    /// Terminal stage
    Complete,
}

impl Stage {
    /// Percent reported when the stage begins
    pub const fn percent(self) -> u8 {
        match self {
            Self::Validating => 0,
            Self::ResolvePattern => 1,
            Self::VerifyPrimaryImage => 2,
            Self::CalculateGrid => 3,
            Self::LoadPrimaryImage => 4,
            Self::BuildCellCache => 5,
            Self::BuildPlan | Self::PreparePrimaryImage | Self::CreateMosaic => 10,
            Self::SaveResults => 95,
            Self::WriteReport => 98,
            Self::Complete => 100,
        }
    }

    /// Percent the stage interpolates toward while it runs
    pub const fn span_end(self) -> u8 {
        match self {
            Self::BuildCellCache => 10,
            Self::CreateMosaic => 95,
            other => other.percent(),
        }
    }

    /// Short human-readable stage label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validating => "Validating settings",
            Self::ResolvePattern => "Resolving pattern",
            Self::VerifyPrimaryImage => "Verifying primary image",
            Self::CalculateGrid => "Calculating grid",
            Self::LoadPrimaryImage => "Loading primary image",
            Self::BuildCellCache => "Analyzing photos",
            Self::BuildPlan => "Planning photo usage",
            Self::PreparePrimaryImage => "Preparing primary image",
            Self::CreateMosaic => "Creating mosaic",
            Self::SaveResults => "Saving results",
            Self::WriteReport => "Writing report",
            Self::Complete => "Complete",
        }
    }
}

/// Full configuration for one generation run
#[derive(Clone, Debug)]
pub struct MosaicRequest {
    /// Target image the mosaic approximates
    pub primary_image: PathBuf,
    /// Candidate photos with their orientations
    pub photos: Vec<PhotoSource>,
    /// Physical print settings
    pub print: PrintSettings,
    /// Cell size and shape settings
    pub cell: CellSettings,
    /// How photos are fitted into cell footprints
    pub fit: FitMode,
    /// Pattern descriptor, e.g. `"Square"` or `"Parquet 2L 1P"`
    pub pattern: String,
    /// Shrink the print to the primary image's aspect ratio
    pub preserve_aspect: bool,
    /// Percent each tile blends toward its target color
    pub color_blend_percent: u8,
    /// Minimum grid distance between placements of one photo
    pub duplicate_spacing: Option<u32>,
    /// Matcher shortlist size, clamped to `[1, 20]`
    pub candidates_considered: usize,
    /// Greedily use every cached photo at least once first
    pub use_all_images: bool,
    /// Write the CSV usage report
    pub write_report: bool,
    /// Override the recommended per-photo use limit
    pub max_uses_override: Option<u32>,
    /// Directory receiving the rendered outputs
    pub output_dir: PathBuf,
    /// Seed for shuffle and tie-breaking randomness
    pub seed: u64,
}

/// Terminal status of a generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The mosaic was rendered and saved
    Complete,
    /// The run was cancelled through its token
    Cancelled,
    /// The run failed; the summary carries the diagnostic
    Failed,
}

/// Immutable result of one generation run
///
/// `error` is populated exactly when `status` is [`RunStatus::Failed`].
#[derive(Clone, Debug)]
pub struct GenerationSummary {
    /// Terminal status of the run
    pub status: RunStatus,
    /// Cell rows in the grid
    pub rows: u32,
    /// Cell columns in the grid
    pub cols: u32,
    /// Output image width in pixels
    pub output_width: u32,
    /// Output image height in pixels
    pub output_height: u32,
    /// Path of the rendered mosaic
    pub mosaic_path: Option<PathBuf>,
    /// Path of the blurred reference overlay
    pub reference_path: Option<PathBuf>,
    /// Path of the usage report, when requested
    pub report_path: Option<PathBuf>,
    /// Photos offered in the request
    pub total_photos: usize,
    /// Photos that survived cache building
    pub cached_photos: usize,
    /// Distinct photos placed at least once
    pub distinct_photos_used: usize,
    /// Placements the pattern produced
    pub placements_total: usize,
    /// Placements that received a photo
    pub placements_filled: usize,
    /// Non-fatal diagnostics accumulated during the run
    pub warnings: Vec<String>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Human-readable diagnostic; absent on success
    pub error: Option<String>,
}

impl GenerationSummary {
    fn terminal(status: RunStatus, error: Option<String>, elapsed: Duration) -> Self {
        Self {
            status,
            rows: 0,
            cols: 0,
            output_width: 0,
            output_height: 0,
            mosaic_path: None,
            reference_path: None,
            report_path: None,
            total_photos: 0,
            cached_photos: 0,
            distinct_photos_used: 0,
            placements_total: 0,
            placements_filled: 0,
            warnings: Vec::new(),
            elapsed,
            error,
        }
    }
}

/// Progress callback receiving `(percent, label)` events
pub type ProgressFn = dyn FnMut(u8, &str) + Send;

/// Orchestrates one mosaic generation run
pub struct MosaicEngine {
    request: MosaicRequest,
    cancel: CancelToken,
    progress: Option<Box<ProgressFn>>,
    last_event: Option<(u8, &'static str)>,
}

impl MosaicEngine {
    /// Create an engine for a request
    pub fn new(request: MosaicRequest) -> Self {
        Self {
            request,
            cancel: CancelToken::new(),
            progress: None,
            last_event: None,
        }
    }

    /// Attach a progress callback
    #[must_use]
    pub fn with_progress(mut self, progress: Box<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Token the caller can use to cancel this run
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the generation to completion
    ///
    /// Never returns an error: failures populate the summary's error
    /// message and cancellation yields the distinguished status. Cached
    /// photo variants are released before this returns, whatever the
    /// outcome.
    pub fn generate(mut self) -> GenerationSummary {
        let started = Instant::now();
        match self.run(started) {
            Ok(summary) => summary,
            Err(MosaicError::Cancelled) => {
                GenerationSummary::terminal(RunStatus::Cancelled, None, started.elapsed())
            }
            Err(err) => GenerationSummary::terminal(
                RunStatus::Failed,
                Some(err.to_string()),
                started.elapsed(),
            ),
        }
    }

    fn run(&mut self, started: Instant) -> Result<GenerationSummary> {
        self.report(Stage::Validating);
        validate_request(&self.request)?;
        self.cancel.checkpoint()?;

        self.report(Stage::ResolvePattern);
        let pattern = PatternInfo::parse(&self.request.pattern)?;

        self.report(Stage::VerifyPrimaryImage);
        let primary_dimensions = probe_dimensions(&self.request.primary_image)?;

        self.report(Stage::CalculateGrid);
        let grid = plan_grid(
            self.request.print,
            self.request.cell,
            primary_dimensions,
            pattern,
            self.request.preserve_aspect,
        )?;

        self.report(Stage::LoadPrimaryImage);
        let primary = load_image(&self.request.primary_image)?;

        self.report(Stage::BuildCellCache);
        let photos = self.request.photos.clone();
        let fit = self.request.fit;
        let mut warnings = Vec::new();
        let mut cache: Vec<CellPhotoCache> = Vec::new();
        for (index, photo) in photos.iter().enumerate() {
            self.cancel.checkpoint()?;
            match cache_photo(photo, &grid, fit, pattern) {
                Ok(Some(entry)) => cache.push(entry),
                Ok(None) => {}
                Err(err) => warnings.push(format!("Skipped '{}': {err}", photo.path.display())),
            }
            self.report_span(Stage::BuildCellCache, index + 1, photos.len());
        }
        if cache.is_empty() {
            return Err(MosaicError::NoUsablePhotos {
                attempted: photos.len(),
            });
        }

        self.report(Stage::BuildPlan);
        let counts = OrientationCounts::tally(cache.iter().map(|entry| entry.orientation));
        let plan = build_plan(&grid, pattern, counts);
        let max_uses = self
            .request
            .max_uses_override
            .unwrap_or(plan.recommended_max_uses)
            .max(1);

        self.report(Stage::PreparePrimaryImage);
        let prepared = fit_to_cell(
            &primary,
            grid.output_width,
            grid.output_height,
            FitMode::CropCenter,
        );
        drop(primary);
        let reference = blurred_copy(&prepared, REFERENCE_BLUR_SIGMA);

        self.report(Stage::CreateMosaic);
        let placements = plan_placements(&grid, pattern, &prepared);
        let mut canvas = prepared;
        let mut history = UsageHistory::new(cache.len());
        let mut assignments: Vec<Option<usize>> = vec![None; placements.len()];
        let mut rng = StdRng::seed_from_u64(self.request.seed);

        if self.request.use_all_images {
            self.assign_whole_library(&mut cache, &placements, &mut assignments, &mut history)?;
        }

        let spacing = self.request.duplicate_spacing.unwrap_or(0);
        let candidates = self.request.candidates_considered;
        let blend = self.request.color_blend_percent;
        let mut order: Vec<usize> = (0..placements.len()).collect();
        order.shuffle(&mut rng);

        let mut filled = 0usize;
        for (step, &placement_index) in order.iter().enumerate() {
            self.cancel.checkpoint()?;
            let Some(placement) = placements.get(placement_index) else {
                continue;
            };

            let photo_index = match assignments.get(placement_index).copied().flatten() {
                Some(assigned) => Some(assigned),
                None => {
                    let chosen = find_best_match(
                        &cache, placement, max_uses, spacing, candidates, &history, &mut rng,
                    );
                    if let Some(chosen_index) = chosen {
                        record_use(&mut cache, &mut history, chosen_index, placement);
                    }
                    chosen
                }
            };

            if let Some(photo_index) = photo_index {
                if composite_placement(&mut canvas, &cache, photo_index, placement, blend) {
                    filled += 1;
                }
            }
            self.report_span(Stage::CreateMosaic, step + 1, placements.len());
        }

        self.report(Stage::SaveResults);
        let stem = output_stem(&self.request.primary_image);
        let output_dir = self.request.output_dir.clone();
        let mosaic_path = output_dir.join(format!("{stem}{MOSAIC_SUFFIX}.png"));
        save_image(&canvas, &mosaic_path)?;
        let reference_path = output_dir.join(format!("{stem}{REFERENCE_SUFFIX}.png"));
        save_image(&reference, &reference_path)?;

        self.report(Stage::WriteReport);
        let report_path = if self.request.write_report {
            let path = output_dir.join(format!("{stem}{REPORT_SUFFIX}.csv"));
            write_usage_report(&path, &cache, &history)?;
            Some(path)
        } else {
            None
        };

        self.report(Stage::Complete);
        let distinct_photos_used = cache.iter().filter(|entry| entry.use_count > 0).count();
        Ok(GenerationSummary {
            status: RunStatus::Complete,
            rows: grid.rows,
            cols: grid.cols,
            output_width: grid.output_width,
            output_height: grid.output_height,
            mosaic_path: Some(mosaic_path),
            reference_path: Some(reference_path),
            report_path,
            total_photos: photos.len(),
            cached_photos: cache.len(),
            distinct_photos_used,
            placements_total: placements.len(),
            placements_filled: filled,
            warnings,
            elapsed: started.elapsed(),
            error: None,
        })
    }

    // Greedy pre-pass: every cached photo claims its globally closest
    // remaining placement, biasing toward using the whole library once.
    fn assign_whole_library(
        &self,
        cache: &mut [CellPhotoCache],
        placements: &[MosaicPlacement],
        assignments: &mut [Option<usize>],
        history: &mut UsageHistory,
    ) -> Result<()> {
        for photo_index in 0..cache.len() {
            self.cancel.checkpoint()?;
            let Some(entry) = cache.get(photo_index) else {
                continue;
            };
            let Some(placement_index) = best_remaining_placement(entry, placements, assignments)
            else {
                continue;
            };
            if let Some(slot) = assignments.get_mut(placement_index) {
                *slot = Some(photo_index);
            }
            if let Some(placement) = placements.get(placement_index) {
                record_use(cache, history, photo_index, placement);
            }
        }
        Ok(())
    }

    fn report(&mut self, stage: Stage) {
        self.emit(stage.percent(), stage.label());
    }

    fn report_span(&mut self, stage: Stage, done: usize, total: usize) {
        let start = usize::from(stage.percent());
        let end = usize::from(stage.span_end());
        let percent = if total == 0 {
            end
        } else {
            start + (end - start) * done.min(total) / total
        };
        self.emit(percent as u8, stage.label());
    }

    // Events are deduplicated so callers see each integer percent of a
    // span once instead of once per iteration.
    fn emit(&mut self, percent: u8, label: &'static str) {
        if self.last_event == Some((percent, label)) {
            return;
        }
        self.last_event = Some((percent, label));
        if let Some(progress) = self.progress.as_mut() {
            progress(percent, label);
        }
    }
}

/// Lightweight plan without generation, for UI preview
///
/// Probes only the primary image header; no photo is decoded.
///
/// # Errors
///
/// Returns the same validation, pattern, and probe errors as a full run.
pub fn plan_request(request: &MosaicRequest) -> Result<MosaicPlan> {
    validate_request(request)?;
    let pattern = PatternInfo::parse(&request.pattern)?;
    let primary_dimensions = probe_dimensions(&request.primary_image)?;
    let grid = plan_grid(
        request.print,
        request.cell,
        primary_dimensions,
        pattern,
        request.preserve_aspect,
    )?;
    let counts = OrientationCounts::tally(request.photos.iter().map(|photo| photo.orientation));
    Ok(build_plan(&grid, pattern, counts))
}

fn validate_request(request: &MosaicRequest) -> Result<()> {
    if request.primary_image.as_os_str().is_empty() {
        return Err(configuration_error("primary image", &"path is empty"));
    }
    if !request.primary_image.is_file() {
        return Err(configuration_error(
            "primary image",
            &format!("'{}' is not a file", request.primary_image.display()),
        ));
    }
    if request.photos.is_empty() {
        return Err(configuration_error("photo list", &"no candidate photos"));
    }
    if request.print.width_in <= 0.0 || request.print.height_in <= 0.0 {
        return Err(configuration_error(
            "print size",
            &"width and height must be positive",
        ));
    }
    if request.print.resolution == 0 {
        return Err(configuration_error("resolution", &"must be at least 1"));
    }
    if request.cell.size_mm <= 0.0 {
        return Err(configuration_error("cell size", &"must be positive"));
    }
    Ok(())
}

fn record_use(
    cache: &mut [CellPhotoCache],
    history: &mut UsageHistory,
    photo_index: usize,
    placement: &MosaicPlacement,
) {
    if let Some(entry) = cache.get_mut(photo_index) {
        entry.use_count += 1;
    }
    history.record(
        photo_index,
        (placement.row, placement.col),
        (placement.x, placement.y),
    );
}

fn composite_placement(
    canvas: &mut RgbImage,
    cache: &[CellPhotoCache],
    photo_index: usize,
    placement: &MosaicPlacement,
    blend_percent: u8,
) -> bool {
    let Some(variant) = cache
        .get(photo_index)
        .and_then(|entry| entry.variant_for(placement.required))
    else {
        return false;
    };
    let mut tile = variant.image.clone();
    if blend_percent > 0 {
        blend_toward(&mut tile, placement.target_average, blend_percent);
    }
    image::imageops::overlay(canvas, &tile, placement.x, placement.y);
    true
}

fn output_stem(primary_image: &std::path::Path) -> String {
    primary_image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("mosaic"))
}
