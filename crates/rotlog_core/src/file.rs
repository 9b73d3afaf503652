//! The persistent rotating file store.
//!
//! On-disk layout for a store named `log` under its directory:
//!
//! ```text
//! <path>/
//! ├─ log        # work buffer: records not yet rotated, < file_max_size
//! ├─ log_7      # oldest retained segment
//! ├─ ...
//! └─ log_10     # newest segment
//! ```
//!
//! Segment numbers grow monotonically and are never reused; eviction
//! removes the smallest number. Directory state is re-derived from the
//! filesystem at the start of every operation that needs counts or
//! ranges - cached counters would go stale the moment another process (or
//! an earlier failed write) touched the directory.

use crate::config::FileStoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::store::{window_bytes, RecordStore};
use rotlog_codec as codec;
use rotlog_storage::{file_exists, scan_segments, segment_sizes, write_atomic, SegmentScan};
use std::fs;
use std::io::SeekFrom;
use std::path::Path;
use tracing::{debug, trace};

/// A rotating store of fixed-size records backed by segment files.
///
/// Single-owner and synchronous: every operation performs its filesystem
/// calls in line. Concurrent use from several threads needs external
/// synchronization, and two processes writing the same `(path, name)`
/// conflict beyond per-file atomicity.
#[derive(Debug)]
pub struct FileStore {
    config: FileStoreConfig,
    /// In-memory copy of the work buffer file. Always record-aligned and
    /// shorter than one full segment.
    work: Vec<u8>,
    /// Read cursor as a logical record index. Not persisted.
    read_pos: u64,
    records_per_file: u64,
}

impl FileStore {
    /// Opens a store, creating its directory if absent.
    ///
    /// An existing work buffer file is loaded into memory; its absence
    /// means an empty work buffer, not an error. The read cursor starts at
    /// the oldest retained record.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or any I/O failure.
    pub fn open(config: FileStoreConfig) -> CoreResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.path)?;

        let work_path = config.work_path();
        let work = if file_exists(&work_path) {
            let raw = fs::read(&work_path)?;
            codec::decode(&raw, &config.bit_pattern, config.compression)?
        } else {
            Vec::new()
        };

        let records_per_file = config.records_per_file();
        let mut store = Self {
            config,
            work,
            read_pos: 0,
            records_per_file,
        };
        // Clamp the cursor to the start of the retained window.
        store.seek(SeekFrom::Start(0))?;
        Ok(store)
    }

    /// The configuration this store was opened with.
    #[must_use]
    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    fn scan(&self) -> CoreResult<SegmentScan> {
        Ok(scan_segments(&self.config.path, &self.config.name)?)
    }

    fn work_records(&self) -> u64 {
        self.work.len() as u64 / self.config.record_size
    }

    /// Reads and decodes segment `n`; `None` when the file is gone
    /// (evicted between scan and read, or a numbering gap).
    fn read_segment(&self, n: u64) -> CoreResult<Option<Vec<u8>>> {
        let path = self.config.segment_path(n);
        if !file_exists(&path) {
            return Ok(None);
        }
        let raw = fs::read(&path)?;
        let decoded = codec::decode(&raw, &self.config.bit_pattern, self.config.compression)?;
        Ok(Some(decoded))
    }

    /// Durably writes `raw` to `path` through the codec, then reads the
    /// artifact back through the full decode path and byte-compares it.
    ///
    /// The read-back doubles I/O on purpose: a write that cannot be read
    /// back verbatim is reported as [`CoreError::Corruption`] and counts
    /// as failed even though bytes reached the disk.
    fn persist(&self, path: &Path, raw: &[u8]) -> CoreResult<()> {
        let encoded = codec::encode(raw, &self.config.bit_pattern, self.config.compression)?;
        write_atomic(path, &encoded)?;

        let echoed = fs::read(path)?;
        let decoded = codec::decode(&echoed, &self.config.bit_pattern, self.config.compression)
            .map_err(|_| CoreError::Corruption {
                path: path.to_path_buf(),
            })?;
        if decoded != raw {
            return Err(CoreError::Corruption {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Removes the oldest segment when the directory already holds the
    /// configured maximum. Called after each new segment write, with the
    /// scan taken before that write.
    fn evict_if_needed(&self, scan: &SegmentScan) -> CoreResult<()> {
        if scan.count >= self.config.max_file_count {
            if let Some(min) = scan.min {
                fs::remove_file(self.config.segment_path(min))?;
                debug!(segment = min, "evicted oldest segment");
            }
        }
        Ok(())
    }

    /// `[min, max]` reachable cursor positions, as record indices.
    fn position_range(&self, scan: &SegmentScan) -> (u64, u64) {
        match (scan.min, scan.max) {
            (Some(min), Some(max)) => (
                min * self.records_per_file,
                (max + 1) * self.records_per_file + self.work_records(),
            ),
            _ => (0, self.work_records()),
        }
    }
}

impl RecordStore for FileStore {
    fn write(&mut self, raw: &[u8]) -> CoreResult<usize> {
        let record_size = self.config.record_size;
        if raw.len() as u64 % record_size != 0 {
            return Err(CoreError::SizeMismatch {
                len: raw.len(),
                record_size,
            });
        }

        let new_records = raw.len() as u64 / record_size;
        let free_in_work = self.records_per_file - self.work_records();

        // Easy case: the input leaves the work buffer short of capacity.
        if new_records < free_in_work {
            self.work.extend_from_slice(raw);
            self.persist(&self.config.work_path(), &self.work)?;
            trace!(bytes = self.work.len(), "persisted work buffer");
            return Ok(raw.len());
        }

        let total = raw.len();
        let mut rest = raw;

        // Fill the work buffer to exactly one segment and rotate it out.
        let take = (free_in_work * record_size) as usize;
        self.work.extend_from_slice(&rest[..take]);
        rest = &rest[take..];

        let scan = self.scan()?;
        let number = scan.next_number();
        self.persist(&self.config.segment_path(number), &self.work)?;
        debug!(segment = number, "rotated work buffer into segment");
        self.evict_if_needed(&scan)?;

        self.work.clear();
        // Drop the stale work file now; a failure later must not leave
        // already-rotated records readable twice.
        match fs::remove_file(self.config.work_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Middle part: whole segments straight from the input.
        let bytes_per_file = (self.records_per_file * record_size) as usize;
        while rest.len() >= bytes_per_file {
            let scan = self.scan()?;
            let number = scan.next_number();
            self.persist(&self.config.segment_path(number), &rest[..bytes_per_file])?;
            debug!(segment = number, "wrote full segment");
            self.evict_if_needed(&scan)?;
            rest = &rest[bytes_per_file..];
        }

        // The remainder becomes the new work buffer.
        self.work = rest.to_vec();
        self.persist(&self.config.work_path(), &self.work)?;
        trace!(bytes = self.work.len(), "persisted work buffer");
        Ok(total)
    }

    fn len(&self) -> CoreResult<u64> {
        let sizes = segment_sizes(&self.config.path, &self.config.name)?;
        let mut byte_count = self.work.len() as u64;

        let identity = self.config.bit_pattern.is_empty()
            && self.config.compression == codec::Method::None;
        if identity {
            // On-disk sizes are the logical sizes.
            byte_count += sizes.values().sum::<u64>();
        } else {
            // Encoded segment sizes are meaningless; every non-empty
            // segment holds exactly one full buffer of records by
            // construction.
            let full = sizes.values().filter(|&&s| s > 0).count() as u64;
            byte_count += full * self.records_per_file * self.config.record_size;
        }

        Ok(byte_count / self.config.record_size)
    }

    fn get_first(&self, n_records: u64) -> CoreResult<Vec<u8>> {
        if n_records == 0 {
            return Err(CoreError::invalid_operation(
                "window size must be at least one record",
            ));
        }
        let scan = self.scan()?;
        // Saturate so an absurdly large window clips instead of
        // overflowing the multiplication.
        let target = window_bytes(n_records, self.config.record_size);

        let mut result = Vec::new();
        if let (Some(min), Some(max)) = (scan.min, scan.max) {
            for number in min..=max {
                if let Some(bytes) = self.read_segment(number)? {
                    result.extend_from_slice(&bytes);
                }
                if result.len() >= target {
                    break;
                }
            }
        }
        result.extend_from_slice(&self.work);
        result.truncate(target);
        Ok(result)
    }

    fn get_latest(&self, n_records: u64) -> CoreResult<Vec<u8>> {
        if n_records == 0 {
            return Err(CoreError::invalid_operation(
                "window size must be at least one record",
            ));
        }
        let scan = self.scan()?;
        let target = window_bytes(n_records, self.config.record_size);

        let mut result = self.work.clone();
        if let (Some(min), Some(max)) = (scan.min, scan.max) {
            let mut number = max;
            while result.len() < target {
                if let Some(mut bytes) = self.read_segment(number)? {
                    bytes.extend_from_slice(&result);
                    result = bytes;
                }
                if number == min {
                    break;
                }
                number -= 1;
            }
        }

        if result.len() > target {
            result = result.split_off(result.len() - target);
        }
        Ok(result)
    }

    fn read(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        let record_size = self.config.record_size as usize;
        let records_needed = buf.len() / record_size;
        let bytes_needed = records_needed * record_size;
        if bytes_needed == 0 {
            return Ok(0);
        }

        let scan = self.scan()?;

        // Eviction may have passed the cursor; clamp it forward.
        let mut file_number = self.read_pos / self.records_per_file;
        if let Some(min) = scan.min {
            if file_number < min {
                self.read_pos = min * self.records_per_file;
                file_number = min;
            }
        }
        let start = ((self.read_pos % self.records_per_file) * self.config.record_size) as usize;

        // Accumulate decoded segments from the cursor's file onwards until
        // the request is covered, skipping numbers eviction removed.
        let mut assembled: Vec<u8> = Vec::new();
        if let (Some(_), Some(max)) = (scan.min, scan.max) {
            while file_number <= max {
                if let Some(bytes) = self.read_segment(file_number)? {
                    assembled.extend_from_slice(&bytes);
                }
                file_number += 1;
                if assembled.len() >= start + bytes_needed {
                    buf[..bytes_needed].copy_from_slice(&assembled[start..start + bytes_needed]);
                    self.read_pos += records_needed as u64;
                    return Ok(bytes_needed);
                }
            }
        }

        // Segments exhausted; spill into the live work buffer.
        assembled.extend_from_slice(&self.work);
        let end = (start + bytes_needed).min(assembled.len());
        if end <= start {
            return Ok(0); // end of stream
        }
        let piece = &assembled[start..end];
        buf[..piece.len()].copy_from_slice(piece);
        self.read_pos += (piece.len() / record_size) as u64;
        Ok(piece.len())
    }

    fn seek(&mut self, pos: SeekFrom) -> CoreResult<u64> {
        let scan = self.scan()?;
        let record_size = self.config.record_size;
        let (min_pos, max_pos) = self.position_range(&scan);

        // Byte offsets resolve to whole records, truncating toward zero.
        let target = match pos {
            SeekFrom::Start(offset) => min_pos as i64 + (offset / record_size) as i64,
            SeekFrom::Current(offset) => self.read_pos as i64 + offset / record_size as i64,
            SeekFrom::End(offset) => max_pos as i64 + offset / record_size as i64,
        };

        self.read_pos = target.clamp(min_pos as i64, max_pos as i64) as u64;
        Ok(self.read_pos * record_size)
    }
}
