//! Candidate photo analysis into color-signature cache entries
//!
//! Each usable photo is loaded once at a bounded resolution, averaged by
//! sparse sampling, and fitted to the cell footprint of every orientation
//! it can serve. The fitted variants are retained for compositing; they
//! are dropped with the cache when the run ends.

use crate::analysis::sampling::{average_color, quadrant_signature};
use crate::io::error::Result;
use crate::io::image::{FitMode, fit_to_cell, load_bounded};
use crate::math::color::{QuadrantSignature, Rgb};
use crate::spatial::grid::GridDimensions;
use crate::spatial::pattern::{Orientation, PatternInfo, RequiredOrientation};
use image::RgbImage;
use std::path::PathBuf;

/// One candidate photo offered to a generation run
#[derive(Clone, Debug)]
pub struct PhotoSource {
    /// Path to the photo file
    pub path: PathBuf,
    /// Aspect classification of the photo
    pub orientation: Orientation,
}

/// A photo variant fitted to one cell footprint
#[derive(Clone, Debug)]
pub struct FittedVariant {
    /// The resized/fitted pixels, ready for compositing
    pub image: RgbImage,
    /// Quadrant signature of the fitted pixels
    pub signature: QuadrantSignature,
}

/// Cached analysis of one candidate photo
///
/// Created during cache build, its use count is mutated during placement,
/// and the whole entry is discarded at run end.
#[derive(Clone, Debug)]
pub struct CellPhotoCache {
    /// Source photo path
    pub path: PathBuf,
    /// Aspect classification of the source photo
    pub orientation: Orientation,
    /// Sparse-sampled whole-image average color
    pub average: Rgb,
    /// Variant fitted to the landscape footprint, when eligible
    pub landscape: Option<FittedVariant>,
    /// Variant fitted to the portrait footprint, when eligible
    pub portrait: Option<FittedVariant>,
    /// Number of placements this photo has filled so far
    pub use_count: u32,
}

impl CellPhotoCache {
    /// Whether this photo can fill a placement with the given requirement
    pub const fn serves(&self, required: RequiredOrientation) -> bool {
        required.admits(self.orientation)
    }

    /// Signature of the variant that would fill such a placement
    pub const fn signature_for(&self, required: RequiredOrientation) -> Option<&QuadrantSignature> {
        match self.variant_for(required) {
            Some(variant) => Some(&variant.signature),
            None => None,
        }
    }

    /// The fitted variant that fills a placement with the given requirement
    ///
    /// `Any` resolves to the photo's native-orientation variant.
    pub const fn variant_for(&self, required: RequiredOrientation) -> Option<&FittedVariant> {
        match required {
            RequiredOrientation::Landscape => self.landscape.as_ref(),
            RequiredOrientation::Portrait => self.portrait.as_ref(),
            RequiredOrientation::Any => match self.landscape.as_ref() {
                Some(variant) => Some(variant),
                None => self.portrait.as_ref(),
            },
        }
    }
}

/// Analyze one candidate photo into a cache entry
///
/// Returns `Ok(None)` when the pattern strictly requires an orientation
/// the photo cannot serve; that is a silent skip, not a failure. Decode
/// failures are returned as errors for the caller to log and skip.
///
/// # Errors
///
/// Returns an error when the photo cannot be loaded or decoded.
pub fn cache_photo(
    photo: &PhotoSource,
    grid: &GridDimensions,
    fit: FitMode,
    pattern: PatternInfo,
) -> Result<Option<CellPhotoCache>> {
    if !pattern.accepts_photo(photo.orientation) {
        return Ok(None);
    }

    let (landscape_w, landscape_h) = grid.landscape_cell;
    let (portrait_w, portrait_h) = grid.portrait_cell;
    let loaded = load_bounded(
        &photo.path,
        landscape_w.max(portrait_w),
        landscape_h.max(portrait_h),
    )?;
    let average = average_color(&loaded);

    let landscape = matches!(
        photo.orientation,
        Orientation::Landscape | Orientation::Square
    )
    .then(|| fitted_variant(&loaded, landscape_w, landscape_h, fit));
    let portrait = matches!(photo.orientation, Orientation::Portrait | Orientation::Square)
        .then(|| fitted_variant(&loaded, portrait_w, portrait_h, fit));

    Ok(Some(CellPhotoCache {
        path: photo.path.clone(),
        orientation: photo.orientation,
        average,
        landscape,
        portrait,
        use_count: 0,
    }))
}

fn fitted_variant(loaded: &RgbImage, width: u32, height: u32, fit: FitMode) -> FittedVariant {
    let image = fit_to_cell(loaded, width, height, fit);
    let signature = quadrant_signature(&image);
    FittedVariant { image, signature }
}
