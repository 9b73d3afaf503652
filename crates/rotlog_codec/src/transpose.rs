//! Bit-level record transposition.
//!
//! Fixed-size records that share a field layout compress poorly in
//! record-major order: the bytes of a rarely-changing field are scattered
//! across the stream. [`slice`] regroups the stream field-major - all
//! instances of field 0, then all instances of field 1, and so on - so a
//! general-purpose compressor sees long runs of near-identical bytes.
//! [`unslice`] is the exact inverse.
//!
//! The buffer is treated as a flat bit sequence where bit 0 of byte 0 is
//! the most significant bit. Trailing bits in the final output byte are
//! zero padding.

use crate::error::{CodecError, CodecResult};

/// Reorders `bytes` from record-major to field-major bit order.
///
/// `pattern` lists the bit width of each field in one record-sized struct.
/// An empty pattern is the identity transform.
///
/// # Errors
///
/// Returns [`CodecError::SizeMismatch`] when the bit length of `bytes` is
/// not a multiple of the pattern's total width.
pub fn slice(bytes: &[u8], pattern: &[u32]) -> CodecResult<Vec<u8>> {
    transpose(bytes, pattern, Direction::Slice)
}

/// Inverse of [`slice`]: recovers record-major order.
///
/// # Errors
///
/// Returns [`CodecError::SizeMismatch`] when the bit length of `bytes` is
/// not a multiple of the pattern's total width.
pub fn unslice(bytes: &[u8], pattern: &[u32]) -> CodecResult<Vec<u8>> {
    transpose(bytes, pattern, Direction::Unslice)
}

#[derive(Clone, Copy)]
enum Direction {
    Slice,
    Unslice,
}

fn transpose(bytes: &[u8], pattern: &[u32], direction: Direction) -> CodecResult<Vec<u8>> {
    if pattern.is_empty() {
        return Ok(bytes.to_vec());
    }

    let bits = bytes.len() * 8;
    let struct_bits = pattern.iter().map(|&w| w as usize).sum::<usize>();
    if struct_bits == 0 || bits % struct_bits != 0 {
        return Err(CodecError::SizeMismatch {
            bits,
            pattern_bits: struct_bits,
        });
    }

    let struct_count = bits / struct_bits;
    let mut out = vec![0u8; bytes.len()];

    // Walk the field-major stream in order; `record_major` is where the
    // same run of bits lives in record-major order.
    let mut field_major = 0usize;
    let mut field_offset = 0usize; // bit offset of the field inside a struct
    for &width in pattern {
        let width = width as usize;
        for index in 0..struct_count {
            let record_major = index * struct_bits + field_offset;
            let (src, dst) = match direction {
                Direction::Slice => (record_major, field_major),
                Direction::Unslice => (field_major, record_major),
            };
            copy_bits(bytes, src, &mut out, dst, width);
            field_major += width;
        }
        field_offset += width;
    }

    Ok(out)
}

fn copy_bits(src: &[u8], src_start: usize, dst: &mut [u8], dst_start: usize, count: usize) {
    for i in 0..count {
        if bit(src, src_start + i) {
            set_bit(dst, dst_start + i);
        }
    }
}

#[inline]
fn bit(bytes: &[u8], index: usize) -> bool {
    bytes[index / 8] & (0x80 >> (index % 8)) != 0
}

#[inline]
fn set_bit(bytes: &mut [u8], index: usize) {
    bytes[index / 8] |= 0x80 >> (index % 8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_pattern_is_identity() {
        let data = vec![0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(slice(&data, &[]).unwrap(), data);
        assert_eq!(unslice(&data, &[]).unwrap(), data);
    }

    #[test]
    fn two_byte_fields() {
        let pattern = [8, 8];
        let input = [1u8, 2, 3, 4];
        let sliced = slice(&input, &pattern).unwrap();
        assert_eq!(sliced, vec![1, 3, 2, 4]);
        assert_eq!(unslice(&sliced, &pattern).unwrap(), input);
    }

    #[test]
    fn uneven_field_widths() {
        // Four structs of 8+8+7+1 bits across twelve bytes.
        let pattern = [8, 8, 7, 1];
        let input = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let sliced = slice(&input, &pattern).unwrap();
        assert_eq!(
            sliced,
            vec![0x01, 0x04, 0x07, 0x0A, 0x02, 0x05, 0x08, 0x0B, 0x02, 0x0C, 0x20, 0x6A]
        );
        assert_eq!(unslice(&sliced, &pattern).unwrap(), input);
    }

    #[test]
    fn size_mismatch_reports_both_sizes() {
        let err = slice(&[1, 2, 3], &[16]).unwrap_err();
        match err {
            CodecError::SizeMismatch { bits, pattern_bits } => {
                assert_eq!(bits, 24);
                assert_eq!(pattern_bits, 16);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_with_pattern() {
        assert_eq!(slice(&[], &[8, 8]).unwrap(), Vec::<u8>::new());
        assert_eq!(unslice(&[], &[8, 8]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn sub_byte_fields_round_trip() {
        let pattern = [3, 5];
        let input = [0b1010_1010, 0b0101_0101];
        let sliced = slice(&input, &pattern).unwrap();
        assert_eq!(unslice(&sliced, &pattern).unwrap(), input);
    }

    proptest! {
        #[test]
        fn unslice_inverts_slice(
            structs in prop::collection::vec(any::<u8>(), 0..64),
            pattern in prop::collection::vec(1u32..12, 1..5),
        ) {
            // Trim the input to a whole number of structs.
            let struct_bits = pattern.iter().sum::<u32>() as usize;
            let mut input = structs;
            while (input.len() * 8) % struct_bits != 0 {
                input.pop();
            }

            let sliced = slice(&input, &pattern).unwrap();
            prop_assert_eq!(unslice(&sliced, &pattern).unwrap(), input);
        }
    }
}
