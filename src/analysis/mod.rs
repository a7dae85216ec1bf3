//! Photo analysis: sparse color sampling, signature caching, and planning

/// Candidate photo loading and signature cache building
pub mod cache;
/// Cell and photo count planning with recommended use limits
pub mod plan;
/// Sparse average-color and quadrant-signature sampling
pub mod sampling;
