//! Store configuration.

use crate::error::{CoreError, CoreResult};
use rotlog_codec::Method;
use rotlog_storage::segment_file_name;
use std::path::PathBuf;

/// Configuration for opening a [`FileStore`](crate::FileStore).
///
/// `name` is the file name prefix inside `path`: the work buffer lives at
/// `<path>/<name>` and closed segments at `<path>/<name>_<N>`. Do not share
/// a `(path, name)` pair between stores.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// File name prefix for the store's files.
    pub name: String,

    /// Size of one record in bytes. All records share this size.
    pub record_size: u64,

    /// How many closed segment files are retained on disk (the work
    /// buffer file is extra). Oldest segments are evicted first.
    pub max_file_count: u64,

    /// Maximum byte size of one segment file. Tail bytes beyond the last
    /// whole record stay unused when this is not a multiple of
    /// `record_size`; prefer a multiple of the filesystem erase block.
    pub file_max_size: u64,

    /// Directory holding the store's files; created if absent.
    pub path: PathBuf,

    /// Bit widths of the sub-fields of one record, used to transpose
    /// payloads before compression. Empty disables transposition.
    pub bit_pattern: Vec<u32>,

    /// Entropy compressor applied to persisted payloads.
    pub compression: Method,
}

impl FileStoreConfig {
    /// Creates a configuration with transposition and compression disabled.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        record_size: u64,
        max_file_count: u64,
        file_max_size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            record_size,
            max_file_count,
            file_max_size,
            path: path.into(),
            bit_pattern: Vec::new(),
            compression: Method::None,
        }
    }

    /// Sets the bit transposition pattern.
    #[must_use]
    pub fn bit_pattern(mut self, pattern: Vec<u32>) -> Self {
        self.bit_pattern = pattern;
        self
    }

    /// Sets the compression method.
    #[must_use]
    pub const fn compression(mut self, method: Method) -> Self {
        self.compression = method;
        self
    }

    /// Sets the compression method from its configuration tag.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tag.
    pub fn compression_tag(mut self, tag: &str) -> CoreResult<Self> {
        self.compression = Method::parse(tag)?;
        Ok(self)
    }

    /// Checks the configuration for problems, before any I/O happens.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for an illegal name,
    /// non-positive sizes or counts, a segment size smaller than one
    /// record, or a transposition pattern that cannot tile record-aligned
    /// buffers.
    pub fn validate(&self) -> CoreResult<()> {
        if !name_ok(&self.name) {
            return Err(CoreError::invalid_config(format!(
                "invalid name {:?}",
                self.name
            )));
        }
        if self.record_size == 0 {
            return Err(CoreError::invalid_config("record_size must be positive"));
        }
        if self.max_file_count == 0 {
            return Err(CoreError::invalid_config("max_file_count must be at least 1"));
        }
        if self.file_max_size == 0 {
            return Err(CoreError::invalid_config("file_max_size must be positive"));
        }
        if self.file_max_size < self.record_size {
            return Err(CoreError::invalid_config(format!(
                "file_max_size ({}) < record_size ({})",
                self.file_max_size, self.record_size
            )));
        }
        if self.bit_pattern.iter().any(|&w| w == 0) {
            return Err(CoreError::invalid_config(
                "bit_pattern widths must be positive",
            ));
        }
        if !self.bit_pattern.is_empty() {
            let pattern_bits = self.bit_pattern.iter().map(|&w| u64::from(w)).sum::<u64>();
            if (self.record_size * 8) % pattern_bits != 0 {
                return Err(CoreError::invalid_config(format!(
                    "bit_pattern width ({pattern_bits} bits) does not divide the \
                     record size ({} bits)",
                    self.record_size * 8
                )));
            }
        }
        Ok(())
    }

    /// Whole records per segment file; excess tail bytes are never used.
    #[must_use]
    pub fn records_per_file(&self) -> u64 {
        self.file_max_size / self.record_size
    }

    /// Path of the work buffer file.
    #[must_use]
    pub fn work_path(&self) -> PathBuf {
        self.path.join(&self.name)
    }

    /// Path of segment file `n`.
    #[must_use]
    pub fn segment_path(&self, n: u64) -> PathBuf {
        self.path.join(segment_file_name(&self.name, n))
    }
}

/// Configuration for a [`MemLoop`](crate::MemLoop) ring.
#[derive(Debug, Clone, Copy)]
pub struct MemLoopConfig {
    /// Size of one record in bytes.
    pub record_size: u64,
    /// Records retained before the oldest are dropped.
    pub max_records: u64,
}

impl MemLoopConfig {
    /// Checks the configuration for problems.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for non-positive sizes.
    pub fn validate(&self) -> CoreResult<()> {
        if self.record_size == 0 {
            return Err(CoreError::invalid_config("record_size must be positive"));
        }
        if self.max_records == 0 {
            return Err(CoreError::invalid_config("max_records must be at least 1"));
        }
        Ok(())
    }
}

/// A name is legal when it can be a single path component.
fn name_ok(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn base() -> FileStoreConfig {
        FileStoreConfig::new("log", "/tmp/rotlog", 8, 4, 128)
    }

    #[test]
    fn valid_config() {
        base().validate().unwrap();
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "a\0b"] {
            let cfg = FileStoreConfig { name: name.into(), ..base() };
            assert!(cfg.validate().is_err(), "name {name:?} accepted");
        }
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(FileStoreConfig { record_size: 0, ..base() }.validate().is_err());
        assert!(FileStoreConfig { max_file_count: 0, ..base() }.validate().is_err());
        assert!(FileStoreConfig { file_max_size: 0, ..base() }.validate().is_err());
    }

    #[test]
    fn rejects_segment_smaller_than_record() {
        let cfg = FileStoreConfig { record_size: 256, ..base() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_pattern_not_dividing_record() {
        // 8-byte records are 64 bits; a 24-bit struct does not tile them.
        assert!(base().bit_pattern(vec![16, 8]).validate().is_err());
        base().bit_pattern(vec![16, 16]).validate().unwrap();
        assert!(base().bit_pattern(vec![8, 0]).validate().is_err());
    }

    #[test]
    fn records_per_file_rounds_down() {
        let cfg = FileStoreConfig { record_size: 7, ..base() };
        // 128 / 7 = 18 whole records, 2 wasted tail bytes per segment.
        assert_eq!(cfg.records_per_file(), 18);
    }

    #[test]
    fn file_paths() {
        let cfg = base();
        assert_eq!(cfg.work_path(), Path::new("/tmp/rotlog/log"));
        assert_eq!(cfg.segment_path(11), Path::new("/tmp/rotlog/log_11"));
    }

    #[test]
    fn compression_tag_surface() {
        let cfg = base().compression_tag("zstd").unwrap();
        assert_eq!(cfg.compression, Method::Zstd);
        assert!(base().compression_tag("lzma").is_err());
    }
}
