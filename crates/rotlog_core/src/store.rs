//! The record store capability interface.

use crate::error::CoreResult;
use std::io::SeekFrom;

/// Byte length of an `n_records` window, saturating on overflow so a huge
/// request clips to what exists instead of panicking.
pub(crate) fn window_bytes(n_records: u64, record_size: u64) -> usize {
    usize::try_from(n_records.saturating_mul(record_size)).unwrap_or(usize::MAX)
}

/// A bounded store of equal-sized binary records.
///
/// Implemented by the persistent [`FileStore`](crate::FileStore) and the
/// volatile [`MemLoop`](crate::MemLoop); callers can swap one for the other
/// behind this trait. Positions are logical record indices expressed in
/// bytes, and every operation works on whole records only.
pub trait RecordStore {
    /// Appends `raw` to the store.
    ///
    /// The length of `raw` must be a multiple of the record size. On
    /// success the whole input was accepted and `raw.len()` is returned;
    /// partial acceptance is not an outcome. After a failure the caller
    /// must re-query [`len`](Self::len) rather than assume how much became
    /// durable.
    ///
    /// # Errors
    ///
    /// Returns an error for a misaligned length or any persistence
    /// failure.
    fn write(&mut self, raw: &[u8]) -> CoreResult<usize>;

    /// Number of records currently retained.
    ///
    /// Recomputed from the backing state on every call, never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing state cannot be inspected.
    fn len(&self) -> CoreResult<u64>;

    /// True when the store retains no records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing state cannot be inspected.
    fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the oldest `n_records` records without moving the read
    /// cursor. Returns everything available when fewer exist; an empty
    /// store yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when `n_records` is zero or reading fails.
    fn get_first(&self, n_records: u64) -> CoreResult<Vec<u8>>;

    /// Returns the newest `n_records` records without moving the read
    /// cursor. Mirrors [`get_first`](Self::get_first) from the other end.
    ///
    /// # Errors
    ///
    /// Returns an error when `n_records` is zero or reading fails.
    fn get_latest(&self, n_records: u64) -> CoreResult<Vec<u8>>;

    /// Sequential read at the cursor into `buf`, advancing the cursor.
    ///
    /// Only whole records are copied; the usable length of `buf` is
    /// rounded down to a multiple of the record size. A cursor that
    /// eviction has passed is first clamped forward to the oldest retained
    /// record. Returns the number of bytes copied; `Ok(0)` signals end of
    /// stream and is not a fault.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing state cannot be read.
    /// [`MemLoop`](crate::MemLoop) additionally rejects a buffer shorter
    /// than one record, which would otherwise read zero bytes forever.
    fn read(&mut self, buf: &mut [u8]) -> CoreResult<usize>;

    /// Moves the read cursor.
    ///
    /// Offsets are in bytes and resolve to record-aligned positions
    /// (integer division by the record size, truncating toward zero). The
    /// reachable range is recomputed from the backing state on every call
    /// and the result is clamped into it. Returns the resulting absolute
    /// position in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing state cannot be inspected.
    fn seek(&mut self, pos: SeekFrom) -> CoreResult<u64>;
}
