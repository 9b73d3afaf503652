//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer's bit length is not a multiple of the pattern width.
    #[error("got {bits} bits, must be multiple of pattern width {pattern_bits}")]
    SizeMismatch {
        /// Bit length of the input buffer.
        bits: usize,
        /// Total width of the transposition pattern in bits.
        pattern_bits: usize,
    },

    /// The compression method tag is not recognized.
    #[error("unsupported compression method: {tag:?}")]
    UnsupportedMethod {
        /// The offending tag.
        tag: String,
    },

    /// The compressor or decompressor failed.
    #[error("compression error: {0}")]
    Compression(#[from] io::Error),
}
