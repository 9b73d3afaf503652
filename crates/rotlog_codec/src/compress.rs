//! Compression method selection and the composed encode/decode pipeline.

use crate::error::{CodecError, CodecResult};
use crate::transpose;

/// Zstd compression level used for segment payloads.
const ZSTD_LEVEL: i32 = 3;

/// The entropy compressor applied after bit transposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    /// No compression; the transposed bytes go to disk as-is.
    #[default]
    None,
    /// Zstandard at a fixed level.
    Zstd,
}

impl Method {
    /// Tag naming the zstd method on the configuration surface.
    pub const ZSTD_TAG: &'static str = "zstd";

    /// Parses a configuration tag into a method.
    ///
    /// The empty string selects [`Method::None`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedMethod`] for any unknown tag.
    pub fn parse(tag: &str) -> CodecResult<Self> {
        match tag {
            "" => Ok(Self::None),
            Self::ZSTD_TAG => Ok(Self::Zstd),
            other => Err(CodecError::UnsupportedMethod {
                tag: other.to_string(),
            }),
        }
    }
}

/// Produces the on-disk bytes for `bytes`: transpose, then compress.
///
/// # Errors
///
/// Returns an error if the bit length of `bytes` does not divide the
/// pattern width, or if the compressor fails.
pub fn encode(bytes: &[u8], pattern: &[u32], method: Method) -> CodecResult<Vec<u8>> {
    let transposed = transpose::slice(bytes, pattern)?;
    match method {
        Method::None => Ok(transposed),
        Method::Zstd => Ok(zstd::stream::encode_all(&transposed[..], ZSTD_LEVEL)?),
    }
}

/// Inverts [`encode`]: decompress, then un-transpose.
///
/// # Errors
///
/// Returns an error if decompression fails or the decompressed bit length
/// does not divide the pattern width.
pub fn decode(bytes: &[u8], pattern: &[u32], method: Method) -> CodecResult<Vec<u8>> {
    let transposed = match method {
        Method::None => bytes.to_vec(),
        Method::Zstd => zstd::stream::decode_all(bytes)?,
    };
    transpose::unslice(&transposed, pattern)
}
