//! # rotlog Codec
//!
//! Payload transforms for rotlog segment files.
//!
//! Two stages compose into the on-disk encoding:
//!
//! 1. **Bit transposition** ([`slice`] / [`unslice`]) - regroups the bits
//!    of fixed-layout records field-major, so sub-fields that rarely change
//!    line up into compressible runs.
//! 2. **Entropy compression** ([`Method`]) - an optional general-purpose
//!    compressor over the transposed bytes.
//!
//! [`encode`] and [`decode`] run both stages. Neither stage is applied when
//! the pattern is empty and the method is [`Method::None`]; the pipeline is
//! then the identity.
//!
//! The codec itself does not verify what reaches the disk. The durable
//! write path in `rotlog_core` reads every artifact back through [`decode`]
//! and byte-compares it against the original before reporting success.
//!
//! ## Example
//!
//! ```
//! use rotlog_codec::{decode, encode, Method};
//!
//! let pattern = [8, 8];
//! let records = [1u8, 2, 3, 4];
//!
//! let on_disk = encode(&records, &pattern, Method::None).unwrap();
//! assert_eq!(on_disk, vec![1, 3, 2, 4]);
//! assert_eq!(decode(&on_disk, &pattern, Method::None).unwrap(), records);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compress;
mod error;
mod transpose;

pub use compress::{decode, encode, Method};
pub use error::{CodecError, CodecResult};
pub use transpose::{slice, unslice};
