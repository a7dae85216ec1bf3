//! Error types for mosaic generation

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// A request field failed validation before any work was performed
    Configuration {
        /// Name of the offending request field
        field: &'static str,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A pattern descriptor string could not be parsed
    PatternParse {
        /// The descriptor as supplied by the caller
        descriptor: String,
        /// Explanation of the parse failure
        reason: String,
    },

    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Every candidate photo was skipped or failed to load
    NoUsablePhotos {
        /// Number of candidates that were attempted
        attempted: usize,
    },

    /// A generation run reported a failure in its result
    ///
    /// Used by callers that turn a failed run summary back into an error,
    /// e.g. so the CLI exits non-zero.
    RunFailed {
        /// Human-readable diagnostic from the run summary
        message: String,
    },

    /// The run was cancelled through its cancellation token
    ///
    /// An expected outcome, not an application failure; the orchestrator
    /// converts it into a distinguished result status at the boundary.
    Cancelled,
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { field, reason } => {
                write!(f, "Invalid configuration '{field}': {reason}")
            }
            Self::PatternParse { descriptor, reason } => {
                write!(f, "Invalid pattern descriptor '{descriptor}': {reason}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::NoUsablePhotos { attempted } => {
                write!(
                    f,
                    "None of the {attempted} candidate photos could be used"
                )
            }
            Self::RunFailed { message } => write!(f, "{message}"),
            Self::Cancelled => write!(f, "Generation was cancelled"),
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

impl From<image::ImageError> for MosaicError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create a configuration error
pub fn configuration_error(field: &'static str, reason: &impl ToString) -> MosaicError {
    MosaicError::Configuration {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_formats_field_and_reason() {
        let err = configuration_error("resolution", &"must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration 'resolution': must be at least 1"
        );
    }

    #[test]
    fn cancellation_is_not_an_application_failure() {
        let err = MosaicError::Cancelled;
        assert!(matches!(err, MosaicError::Cancelled));
        assert_eq!(err.to_string(), "Generation was cancelled");
    }
}
