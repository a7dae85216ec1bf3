//! Pattern kinds, photo orientations, and the descriptor string grammar
//!
//! Descriptors are `"Square"`, `"Landscape"`, `"Portrait"`, or
//! `"Parquet <N>L <M>P"`, case-insensitive. A bare `"Parquet"` defaults to
//! a 1:1 landscape:portrait ratio.

use crate::io::error::{MosaicError, Result};

/// Aspect classification of a photo or cell footprint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Wider than tall
    Landscape,
    /// Taller than wide
    Portrait,
    /// Equal sides
    Square,
}

impl Orientation {
    /// Classify pixel dimensions
    pub const fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else if height > width {
            Self::Portrait
        } else {
            Self::Square
        }
    }
}

/// Orientation a placement demands from the photo that fills it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredOrientation {
    /// Any photo orientation serves
    Any,
    /// Landscape or square photos serve
    Landscape,
    /// Portrait or square photos serve
    Portrait,
}

impl RequiredOrientation {
    /// Whether a photo of the given orientation can fill this placement
    pub const fn admits(self, photo: Orientation) -> bool {
        match self {
            Self::Any => true,
            Self::Landscape => matches!(photo, Orientation::Landscape | Orientation::Square),
            Self::Portrait => matches!(photo, Orientation::Portrait | Orientation::Square),
        }
    }
}

/// Tiling pattern selected for a generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// Uniform grid of square cells, any photo orientation
    Square,
    /// Uniform grid of landscape cells
    LandscapeOnly,
    /// Uniform grid of portrait cells
    PortraitOnly,
    /// Interlocking mix of landscape and portrait cells
    Parquet {
        /// Landscape cells per repeat of the tiling sequence, at least 1
        landscape: u32,
        /// Portrait cells per repeat of the tiling sequence, at least 1
        portrait: u32,
    },
}

/// Resolved pattern for one generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternInfo {
    /// The tiling kind, with repeat ratios for parquet
    pub kind: PatternKind,
}

impl PatternInfo {
    /// Parse a pattern descriptor string
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::PatternParse`] when the descriptor does not
    /// follow the grammar or a parquet ratio is zero.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut tokens = descriptor.split_whitespace();
        let head = tokens
            .next()
            .ok_or_else(|| parse_error(descriptor, "descriptor is empty"))?;

        let kind = match head.to_ascii_lowercase().as_str() {
            "square" => PatternKind::Square,
            "landscape" => PatternKind::LandscapeOnly,
            "portrait" => PatternKind::PortraitOnly,
            "parquet" => parse_parquet_ratio(descriptor, tokens)?,
            other => {
                return Err(parse_error(
                    descriptor,
                    &format!("unknown pattern '{other}'"),
                ));
            }
        };

        if tokens_remaining(descriptor, kind) {
            return Err(parse_error(descriptor, "trailing tokens after pattern"));
        }

        Ok(Self { kind })
    }

    /// Orientation demanded from photos by uniform-grid placements
    ///
    /// Parquet placements carry their own per-cell orientation and never
    /// consult this.
    pub const fn required_orientation(self) -> RequiredOrientation {
        match self.kind {
            PatternKind::Square | PatternKind::Parquet { .. } => RequiredOrientation::Any,
            PatternKind::LandscapeOnly => RequiredOrientation::Landscape,
            PatternKind::PortraitOnly => RequiredOrientation::Portrait,
        }
    }

    /// Whether a photo of the given orientation can appear anywhere in
    /// this pattern
    ///
    /// Strictly one-orientation patterns reject the opposite orientation
    /// outright; parquet and square admit everything.
    pub const fn accepts_photo(self, photo: Orientation) -> bool {
        match self.kind {
            PatternKind::LandscapeOnly => {
                matches!(photo, Orientation::Landscape | Orientation::Square)
            }
            PatternKind::PortraitOnly => {
                matches!(photo, Orientation::Portrait | Orientation::Square)
            }
            PatternKind::Square | PatternKind::Parquet { .. } => true,
        }
    }

    /// Whether this is the parquet pattern
    pub const fn is_parquet(self) -> bool {
        matches!(self.kind, PatternKind::Parquet { .. })
    }
}

fn parse_parquet_ratio<'a>(
    descriptor: &str,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<PatternKind> {
    let mut landscape = None;
    let mut portrait = None;

    for token in tokens {
        let lowered = token.to_ascii_lowercase();
        if let Some(count) = lowered.strip_suffix('l') {
            landscape = Some(parse_ratio_count(descriptor, count, "landscape")?);
        } else if let Some(count) = lowered.strip_suffix('p') {
            portrait = Some(parse_ratio_count(descriptor, count, "portrait")?);
        } else {
            return Err(parse_error(
                descriptor,
                &format!("expected '<N>L' or '<M>P', found '{token}'"),
            ));
        }
    }

    // A bare "Parquet" alternates one of each
    Ok(PatternKind::Parquet {
        landscape: landscape.unwrap_or(1),
        portrait: portrait.unwrap_or(1),
    })
}

fn parse_ratio_count(descriptor: &str, digits: &str, side: &str) -> Result<u32> {
    let count: u32 = digits
        .parse()
        .map_err(|_| parse_error(descriptor, &format!("invalid {side} ratio '{digits}'")))?;
    if count == 0 {
        return Err(parse_error(
            descriptor,
            &format!("{side} ratio must be at least 1"),
        ));
    }
    Ok(count)
}

// Non-parquet descriptors are a single token; the parquet arm consumes the
// iterator itself, so only the single-token kinds can have leftovers.
fn tokens_remaining(descriptor: &str, kind: PatternKind) -> bool {
    if matches!(kind, PatternKind::Parquet { .. }) {
        return false;
    }
    descriptor.split_whitespace().count() > 1
}

fn parse_error(descriptor: &str, reason: &str) -> MosaicError {
    MosaicError::PatternParse {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_kinds_case_insensitively() {
        for descriptor in ["Square", "SQUARE", "square"] {
            let info = PatternInfo::parse(descriptor).map(|p| p.kind);
            assert_eq!(info.ok(), Some(PatternKind::Square));
        }
        assert_eq!(
            PatternInfo::parse("Landscape").map(|p| p.kind).ok(),
            Some(PatternKind::LandscapeOnly)
        );
        assert_eq!(
            PatternInfo::parse("portrait").map(|p| p.kind).ok(),
            Some(PatternKind::PortraitOnly)
        );
    }

    #[test]
    fn bare_parquet_defaults_to_one_to_one() {
        assert_eq!(
            PatternInfo::parse("Parquet").map(|p| p.kind).ok(),
            Some(PatternKind::Parquet {
                landscape: 1,
                portrait: 1
            })
        );
    }

    #[test]
    fn parses_parquet_ratio_tokens() {
        assert_eq!(
            PatternInfo::parse("parquet 2L 1p").map(|p| p.kind).ok(),
            Some(PatternKind::Parquet {
                landscape: 2,
                portrait: 1
            })
        );
    }

    #[test]
    fn rejects_zero_ratios_and_junk() {
        assert!(PatternInfo::parse("parquet 0l 1p").is_err());
        assert!(PatternInfo::parse("parquet 2x").is_err());
        assert!(PatternInfo::parse("herringbone").is_err());
        assert!(PatternInfo::parse("").is_err());
        assert!(PatternInfo::parse("square extra").is_err());
    }

    #[test]
    fn orientation_admission_rules() {
        assert!(RequiredOrientation::Landscape.admits(Orientation::Square));
        assert!(!RequiredOrientation::Landscape.admits(Orientation::Portrait));
        assert!(RequiredOrientation::Any.admits(Orientation::Portrait));
        assert!(PatternInfo::parse("portrait")
            .map(|p| !p.accepts_photo(Orientation::Landscape))
            .unwrap_or(false));
    }
}
