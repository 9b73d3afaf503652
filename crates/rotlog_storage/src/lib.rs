//! # rotlog Storage
//!
//! File system primitives for the rotlog record store.
//!
//! This crate provides the lowest-level persistence building blocks:
//!
//! - [`write_atomic`] - crash-safe whole-file replacement (temp file,
//!   fsync, atomic rename)
//! - [`scan_segments`] / [`segment_sizes`] - directory scans over the
//!   numbered segment files of a store
//!
//! The primitives here are byte-oriented and know nothing about records,
//! rotation, or compression. `rotlog_core` owns all of that.
//!
//! ## Example
//!
//! ```no_run
//! use rotlog_storage::write_atomic;
//! use std::path::Path;
//!
//! let written = write_atomic(Path::new("data/log_3"), b"payload").unwrap();
//! assert_eq!(written, 7);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod atomic;
mod error;
mod scan;

pub use atomic::{write_atomic, TempSibling, TMP_SUFFIX};
pub use error::{StorageError, StorageResult};
pub use scan::{file_exists, scan_segments, segment_file_name, segment_sizes, SegmentScan};
