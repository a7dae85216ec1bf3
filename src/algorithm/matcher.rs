//! Photo selection under use-limit and spacing constraints
//!
//! Candidates are filtered, ranked by quadrant-signature distance, and one
//! of the top few is chosen at random. No surviving candidate is a normal
//! outcome: the cell is simply left unfilled.

use crate::algorithm::placement::MosaicPlacement;
use crate::analysis::cache::CellPhotoCache;
use crate::io::configuration::{MAX_CANDIDATES_CONSIDERED, MIN_CANDIDATES_CONSIDERED};
use rand::Rng;
use rand::rngs::StdRng;
use std::cmp::Ordering;
use std::path::PathBuf;

/// One recorded placement of a photo, for reporting
#[derive(Clone, Debug)]
pub struct CellUsage {
    /// Path of the placed photo
    pub path: PathBuf,
    /// Pixel x of the placement origin
    pub x: i64,
    /// Pixel y of the placement origin
    pub y: i64,
}

/// Per-photo placement history, exclusively owned by one run
#[derive(Clone, Debug)]
pub struct UsageHistory {
    grid_positions: Vec<Vec<(i32, i32)>>,
    pixel_positions: Vec<Vec<(i64, i64)>>,
}

impl UsageHistory {
    /// Create an empty history for a cache of the given size
    pub fn new(photo_count: usize) -> Self {
        Self {
            grid_positions: vec![Vec::new(); photo_count],
            pixel_positions: vec![Vec::new(); photo_count],
        }
    }

    /// Record one placement of a photo
    pub fn record(&mut self, photo: usize, grid_position: (i32, i32), pixel_position: (i64, i64)) {
        if let Some(positions) = self.grid_positions.get_mut(photo) {
            positions.push(grid_position);
        }
        if let Some(positions) = self.pixel_positions.get_mut(photo) {
            positions.push(pixel_position);
        }
    }

    /// Grid positions where a photo has been placed
    pub fn grid_positions_of(&self, photo: usize) -> &[(i32, i32)] {
        self.grid_positions.get(photo).map_or(&[], Vec::as_slice)
    }

    /// Pixel positions where a photo has been placed
    pub fn pixel_positions_of(&self, photo: usize) -> &[(i64, i64)] {
        self.pixel_positions.get(photo).map_or(&[], Vec::as_slice)
    }
}

/// Pick a cached photo for a target placement
///
/// Filters to photos under the use limit, orientation-compatible, and,
/// when `spacing > 0`, not already placed within `spacing` grid units of
/// the target in both axes. Survivors are ranked by signature distance and
/// one of the best `candidate_count` (clamped to `[1, 20]`) is chosen
/// uniformly at random. Returns `None` when nothing survives; the caller
/// leaves the cell unfilled.
pub fn find_best_match(
    cache: &[CellPhotoCache],
    target: &MosaicPlacement,
    max_uses: u32,
    spacing: u32,
    candidate_count: usize,
    history: &UsageHistory,
    rng: &mut StdRng,
) -> Option<usize> {
    let mut ranked: Vec<(f64, usize)> = Vec::new();

    for (index, entry) in cache.iter().enumerate() {
        if entry.use_count >= max_uses || !entry.serves(target.required) {
            continue;
        }
        let Some(signature) = entry.signature_for(target.required) else {
            continue;
        };
        if spacing > 0 && violates_spacing(history.grid_positions_of(index), target, spacing) {
            continue;
        }
        ranked.push((signature.distance(&target.target_signature), index));
    }

    if ranked.is_empty() {
        return None;
    }

    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let shortlist = candidate_count
        .clamp(MIN_CANDIDATES_CONSIDERED, MAX_CANDIDATES_CONSIDERED)
        .min(ranked.len());
    let choice = rng.random_range(0..shortlist);
    ranked.get(choice).map(|&(_, index)| index)
}

/// Best remaining placement for one photo, for the use-all pre-pass
///
/// Scans placements that have no assignment yet and returns the index of
/// the one whose target signature is closest to the photo's.
pub fn best_remaining_placement(
    entry: &CellPhotoCache,
    placements: &[MosaicPlacement],
    assignments: &[Option<usize>],
) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;

    for (index, placement) in placements.iter().enumerate() {
        if assignments.get(index).copied().flatten().is_some() {
            continue;
        }
        if !entry.serves(placement.required) {
            continue;
        }
        let Some(signature) = entry.signature_for(placement.required) else {
            continue;
        };
        let distance = signature.distance(&placement.target_signature);
        let better = best.is_none_or(|(best_distance, _)| distance < best_distance);
        if better {
            best = Some((distance, index));
        }
    }

    best.map(|(_, index)| index)
}

fn violates_spacing(positions: &[(i32, i32)], target: &MosaicPlacement, spacing: u32) -> bool {
    let spacing = spacing as i32;
    positions
        .iter()
        .any(|&(row, col)| (row - target.row).abs() <= spacing && (col - target.col).abs() <= spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cache::FittedVariant;
    use crate::math::color::{QuadrantSignature, Rgb};
    use crate::spatial::pattern::{Orientation, RequiredOrientation};
    use image::RgbImage;
    use rand::SeedableRng;

    fn photo(color: Rgb) -> CellPhotoCache {
        let signature = QuadrantSignature::new([color; 4]);
        CellPhotoCache {
            path: PathBuf::from(format!("{}-{}-{}.png", color.r, color.g, color.b)),
            orientation: Orientation::Square,
            average: color,
            landscape: Some(FittedVariant {
                image: RgbImage::from_pixel(2, 2, image::Rgb([color.r, color.g, color.b])),
                signature,
            }),
            portrait: None,
            use_count: 0,
        }
    }

    fn target(color: Rgb, row: i32, col: i32) -> MosaicPlacement {
        MosaicPlacement {
            row,
            col,
            x: i64::from(col) * 10,
            y: i64::from(row) * 10,
            width: 10,
            height: 10,
            required: RequiredOrientation::Any,
            target_average: color,
            target_signature: QuadrantSignature::new([color; 4]),
        }
    }

    #[test]
    fn shortlist_of_one_is_deterministic() {
        let cache = vec![
            photo(Rgb::new(255, 0, 0)),
            photo(Rgb::new(0, 255, 0)),
            photo(Rgb::new(0, 0, 255)),
        ];
        let history = UsageHistory::new(cache.len());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..8 {
            let chosen = find_best_match(
                &cache,
                &target(Rgb::new(0, 250, 5), 0, 0),
                10,
                0,
                1,
                &history,
                &mut rng,
            );
            assert_eq!(chosen, Some(1));
        }
    }

    #[test]
    fn exhausted_photos_are_filtered_out() {
        let mut cache = vec![photo(Rgb::new(10, 10, 10)), photo(Rgb::new(20, 20, 20))];
        for entry in &mut cache {
            entry.use_count = 1;
        }
        let history = UsageHistory::new(cache.len());
        let mut rng = StdRng::seed_from_u64(2);
        let chosen = find_best_match(
            &cache,
            &target(Rgb::new(10, 10, 10), 0, 0),
            1,
            0,
            5,
            &history,
            &mut rng,
        );
        assert_eq!(chosen, None);
    }

    #[test]
    fn spacing_excludes_nearby_repeats() {
        let cache = vec![photo(Rgb::new(50, 50, 50))];
        let mut history = UsageHistory::new(1);
        history.record(0, (2, 2), (20, 20));
        let mut rng = StdRng::seed_from_u64(3);

        let near = find_best_match(
            &cache,
            &target(Rgb::new(50, 50, 50), 3, 3),
            10,
            2,
            5,
            &history,
            &mut rng,
        );
        assert_eq!(near, None);

        let far = find_best_match(
            &cache,
            &target(Rgb::new(50, 50, 50), 8, 8),
            10,
            2,
            5,
            &history,
            &mut rng,
        );
        assert_eq!(far, Some(0));
    }

    #[test]
    fn orientation_requirements_are_respected() {
        let mut landscape_only = photo(Rgb::new(1, 1, 1));
        landscape_only.orientation = Orientation::Landscape;
        let cache = vec![landscape_only];
        let history = UsageHistory::new(1);
        let mut rng = StdRng::seed_from_u64(4);
        let mut portrait_target = target(Rgb::new(1, 1, 1), 0, 0);
        portrait_target.required = RequiredOrientation::Portrait;
        let chosen = find_best_match(&cache, &portrait_target, 10, 0, 5, &history, &mut rng);
        assert_eq!(chosen, None);
    }

    #[test]
    fn pre_pass_prefers_the_closest_unassigned_cell() {
        let entry = photo(Rgb::new(200, 10, 10));
        let placements = vec![
            target(Rgb::new(0, 200, 0), 0, 0),
            target(Rgb::new(210, 5, 5), 0, 1),
            target(Rgb::new(190, 20, 20), 0, 2),
        ];
        let mut assignments = vec![None; 3];
        assert_eq!(
            best_remaining_placement(&entry, &placements, &assignments),
            Some(1)
        );
        assignments = vec![None, Some(0), None];
        assert_eq!(
            best_remaining_placement(&entry, &placements, &assignments),
            Some(2)
        );
    }
}
