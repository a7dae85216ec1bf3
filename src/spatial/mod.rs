//! Spatial layout: pattern descriptors, grid planning, and parquet tiling
//!
//! This module contains layout-related functionality including:
//! - Pattern descriptor parsing and orientation rules
//! - Pixel grid derivation from print settings
//! - Unit-grid occupancy tracking
//! - Interleaved parquet tiling

/// Pixel grid derivation from print size, resolution, and cell settings
pub mod grid;
/// Unit-cell occupancy tracking for irregular tilings
pub mod occupancy;
/// Interleaved landscape/portrait parquet tiling
pub mod parquet;
/// Pattern kinds, orientations, and descriptor parsing
pub mod pattern;

pub use grid::GridDimensions;
pub use pattern::{Orientation, PatternInfo, PatternKind, RequiredOrientation};
