//! Error types for rotlog core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in rotlog store operations.
///
/// End-of-stream is deliberately not represented here:
/// [`RecordStore::read`](crate::RecordStore::read) returns `Ok(0)` when the
/// cursor has no more data, so exhaustion is always distinguishable from a
/// fault.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage primitive error (open/write/sync/rename/stat/list).
    #[error("storage error: {0}")]
    Storage(#[from] rotlog_storage::StorageError),

    /// Codec error (transposition width mismatch or compressor failure).
    #[error("codec error: {0}")]
    Codec(#[from] rotlog_codec::CodecError),

    /// I/O error raised directly by the store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid store configuration, rejected before any I/O.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of the configuration problem.
        message: String,
    },

    /// A write's byte length is not a multiple of the record size.
    #[error("write of {len} bytes is not a multiple of record size {record_size}")]
    SizeMismatch {
        /// Byte length of the rejected write.
        len: usize,
        /// Configured record size.
        record_size: u64,
    },

    /// A single write exceeds the total capacity of a bounded ring.
    #[error("write of {len} bytes exceeds ring capacity {capacity}")]
    CapacityExceeded {
        /// Byte length of the rejected write.
        len: usize,
        /// Total ring capacity in bytes.
        capacity: u64,
    },

    /// The read-back after a durable write did not match what was written.
    ///
    /// The bytes physically reached the disk but the write still counts as
    /// failed; detecting silent corruption outranks throughput here.
    #[error("read-back verification failed for {path}")]
    Corruption {
        /// The file whose read-back mismatched.
        path: PathBuf,
    },

    /// An operation argument is out of range.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
