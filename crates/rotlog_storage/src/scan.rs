//! Directory scans over numbered segment files.
//!
//! A store named `telemetry` keeps its work buffer at `telemetry` and its
//! closed segments at `telemetry_0`, `telemetry_1`, ... Scans re-derive the
//! live segment range from the directory on every call; nothing here is
//! cached, so external mutation of the directory is always observed.

use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of scanning a store directory for numbered segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentScan {
    /// Smallest live segment number, if any segment exists.
    pub min: Option<u64>,
    /// Largest non-empty segment number, if any segment exists.
    pub max: Option<u64>,
    /// Number of segment files found.
    pub count: u64,
}

impl SegmentScan {
    /// True when the directory holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The segment number the next rotation should use.
    #[must_use]
    pub fn next_number(&self) -> u64 {
        self.max.map_or(0, |m| m + 1)
    }
}

/// Builds the file name of segment `n` for a store called `name`.
#[must_use]
pub fn segment_file_name(name: &str, n: u64) -> String {
    format!("{name}_{n}")
}

/// Returns true if `path` names an existing regular file.
#[must_use]
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Scans `dir` for segment files of the store `name`.
///
/// Entries are matched against the `<name>_<N>` pattern with N a base-10
/// integer; anything else (including the work buffer file and abandoned
/// `_TMP` siblings) is ignored. A segment only counts towards `max` when
/// it is non-empty, mirroring how rotation picks the next number.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or an entry cannot
/// be stat'ed.
pub fn scan_segments(dir: &Path, name: &str) -> StorageResult<SegmentScan> {
    let mut min: Option<u64> = None;
    let mut max: Option<u64> = None;
    let mut count = 0u64;

    for (number, size, _) in numbered_entries(dir, name)? {
        count += 1;
        min = Some(min.map_or(number, |m| m.min(number)));
        if size > 0 {
            max = Some(max.map_or(number, |m| m.max(number)));
        }
    }

    // All-empty segments carry no readable records; treat as no range.
    if max.is_none() {
        return Ok(SegmentScan {
            min: None,
            max: None,
            count,
        });
    }

    Ok(SegmentScan { min, max, count })
}

/// Maps live segment numbers to their on-disk byte sizes.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or an entry cannot
/// be stat'ed.
pub fn segment_sizes(dir: &Path, name: &str) -> StorageResult<BTreeMap<u64, u64>> {
    let mut sizes = BTreeMap::new();
    for (number, size, _) in numbered_entries(dir, name)? {
        sizes.insert(number, size);
    }
    Ok(sizes)
}

/// Yields `(segment number, size, path)` for every matching entry.
fn numbered_entries(dir: &Path, name: &str) -> StorageResult<Vec<(u64, u64, PathBuf)>> {
    if !dir.is_dir() {
        return Err(StorageError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let prefix = format!("{name}_");
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(suffix) = file_name.strip_prefix(&prefix) else {
            continue;
        };
        let Ok(number) = suffix.parse::<u64>() else {
            continue;
        };
        out.push((number, meta.len(), entry.path()));
    }
    Ok(out)
}
