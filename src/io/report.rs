//! CSV usage report: one row per placement, unused photos included
//!
//! Format is `Name,UseCount,X,Y`. A photo placed N times appears N times,
//! each row carrying that placement's pixel coordinates; an unused photo
//! appears once with empty coordinate fields.

use crate::algorithm::matcher::{CellUsage, UsageHistory};
use crate::analysis::cache::CellPhotoCache;
use crate::io::error::{MosaicError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the usage report for a finished run
///
/// # Errors
///
/// Returns [`MosaicError::FileSystem`] when the file cannot be created or
/// written.
pub fn write_usage_report(
    path: &Path,
    cache: &[CellPhotoCache],
    history: &UsageHistory,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| file_error(path, source))?;
        }
    }
    let file = File::create(path).map_err(|source| file_error(path, source))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "Name,UseCount,X,Y").map_err(|source| file_error(path, source))?;
    for (index, entry) in cache.iter().enumerate() {
        let name = entry
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let usages = photo_usages(entry, history, index);
        if usages.is_empty() {
            writeln!(writer, "{name},0,,").map_err(|source| file_error(path, source))?;
        } else {
            for usage in &usages {
                writeln!(writer, "{name},{},{},{}", usages.len(), usage.x, usage.y)
                    .map_err(|source| file_error(path, source))?;
            }
        }
    }

    writer.flush().map_err(|source| file_error(path, source))
}

fn photo_usages(entry: &CellPhotoCache, history: &UsageHistory, index: usize) -> Vec<CellUsage> {
    history
        .pixel_positions_of(index)
        .iter()
        .map(|&(x, y)| CellUsage {
            path: entry.path.clone(),
            x,
            y,
        })
        .collect()
}

fn file_error(path: &Path, source: std::io::Error) -> MosaicError {
    MosaicError::FileSystem {
        path: path.to_path_buf(),
        operation: "write usage report",
        source,
    }
}
