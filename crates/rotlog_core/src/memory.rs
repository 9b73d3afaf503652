//! Volatile in-memory ring of fixed-size records.
//!
//! Same [`RecordStore`] contract as the file-backed store, without any
//! persistence. Useful as a test double and for ephemeral buffering.

use crate::config::MemLoopConfig;
use crate::error::{CoreError, CoreResult};
use crate::store::{window_bytes, RecordStore};
use std::io::SeekFrom;

/// A bounded in-memory record ring.
///
/// Keeps the newest `max_records` records; older ones are dropped as new
/// data arrives. Positions start at zero and do not track dropped history,
/// unlike the file store's monotonic positions.
#[derive(Debug)]
pub struct MemLoop {
    config: MemLoopConfig,
    mem: Vec<u8>,
    /// Read cursor as a record index into `mem`.
    read_pos: u64,
}

impl MemLoop {
    /// Creates an empty ring.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration.
    pub fn open(config: MemLoopConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mem: Vec::new(),
            read_pos: 0,
        })
    }

    /// Returns the full retained content, oldest record first.
    #[must_use]
    pub fn read_all(&self) -> &[u8] {
        &self.mem
    }

    fn record_count(&self) -> u64 {
        self.mem.len() as u64 / self.config.record_size
    }

    fn capacity_bytes(&self) -> u64 {
        self.config.record_size * self.config.max_records
    }
}

impl RecordStore for MemLoop {
    fn write(&mut self, raw: &[u8]) -> CoreResult<usize> {
        let record_size = self.config.record_size;
        if raw.len() as u64 % record_size != 0 {
            return Err(CoreError::SizeMismatch {
                len: raw.len(),
                record_size,
            });
        }
        let capacity = self.capacity_bytes();
        if raw.len() as u64 > capacity {
            return Err(CoreError::CapacityExceeded {
                len: raw.len(),
                capacity,
            });
        }

        self.mem.extend_from_slice(raw);
        if self.mem.len() as u64 > capacity {
            // Drop the oldest records and keep the cursor on the record
            // it pointed at, or at the new start if that was dropped.
            let excess = self.mem.len() - capacity as usize;
            self.mem.drain(..excess);
            let dropped = excess as u64 / record_size;
            self.read_pos = self.read_pos.saturating_sub(dropped);
        }
        Ok(raw.len())
    }

    fn len(&self) -> CoreResult<u64> {
        Ok(self.record_count())
    }

    fn get_first(&self, n_records: u64) -> CoreResult<Vec<u8>> {
        if n_records == 0 {
            return Err(CoreError::invalid_operation(
                "window size must be at least one record",
            ));
        }
        let end = window_bytes(n_records, self.config.record_size).min(self.mem.len());
        Ok(self.mem[..end].to_vec())
    }

    fn get_latest(&self, n_records: u64) -> CoreResult<Vec<u8>> {
        if n_records == 0 {
            return Err(CoreError::invalid_operation(
                "window size must be at least one record",
            ));
        }
        let target = window_bytes(n_records, self.config.record_size);
        let start = self.mem.len().saturating_sub(target);
        Ok(self.mem[start..].to_vec())
    }

    fn read(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        let record_size = self.config.record_size as usize;
        let records_wanted = buf.len() / record_size;
        if records_wanted == 0 {
            // A buffer that cannot hold one record would otherwise read
            // zero bytes forever; a looping caller must not mistake that
            // for end of stream.
            return Err(CoreError::invalid_operation(
                "read buffer shorter than one record",
            ));
        }

        let available = self.record_count().saturating_sub(self.read_pos);
        let records = (records_wanted as u64).min(available);
        if records == 0 {
            return Ok(0); // end of stream
        }

        let start = (self.read_pos * self.config.record_size) as usize;
        let bytes = (records * self.config.record_size) as usize;
        buf[..bytes].copy_from_slice(&self.mem[start..start + bytes]);
        self.read_pos += records;
        Ok(bytes)
    }

    fn seek(&mut self, pos: SeekFrom) -> CoreResult<u64> {
        let record_size = self.config.record_size;
        let max_pos = self.record_count();

        let target = match pos {
            SeekFrom::Start(offset) => (offset / record_size) as i64,
            SeekFrom::Current(offset) => self.read_pos as i64 + offset / record_size as i64,
            SeekFrom::End(offset) => max_pos as i64 + offset / record_size as i64,
        };

        self.read_pos = target.clamp(0, max_pos as i64) as u64;
        Ok(self.read_pos * record_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(max_records: u64) -> MemLoop {
        MemLoop::open(MemLoopConfig {
            record_size: 4,
            max_records,
        })
        .unwrap()
    }

    fn record(value: u8) -> Vec<u8> {
        vec![value; 4]
    }

    #[test]
    fn open_rejects_invalid_config() {
        assert!(MemLoop::open(MemLoopConfig {
            record_size: 0,
            max_records: 8
        })
        .is_err());
        assert!(MemLoop::open(MemLoopConfig {
            record_size: 4,
            max_records: 0
        })
        .is_err());
    }

    #[test]
    fn write_and_len() {
        let mut ring = ring(8);
        assert_eq!(ring.len().unwrap(), 0);
        ring.write(&record(1)).unwrap();
        ring.write(&record(2)).unwrap();
        assert_eq!(ring.len().unwrap(), 2);
    }

    #[test]
    fn rejects_misaligned_and_oversized_writes() {
        let mut ring = ring(2);
        assert!(matches!(
            ring.write(&[1, 2, 3]),
            Err(CoreError::SizeMismatch { .. })
        ));
        assert!(matches!(
            ring.write(&[0u8; 12]),
            Err(CoreError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn rollover_drops_oldest() {
        let mut ring = ring(3);
        for i in 1..=5u8 {
            ring.write(&record(i)).unwrap();
        }
        assert_eq!(ring.len().unwrap(), 3);
        assert_eq!(ring.read_all(), [record(3), record(4), record(5)].concat());
    }

    #[test]
    fn windows() {
        let mut ring = ring(8);
        for i in 1..=4u8 {
            ring.write(&record(i)).unwrap();
        }
        assert_eq!(
            ring.get_first(2).unwrap(),
            [record(1), record(2)].concat()
        );
        assert_eq!(
            ring.get_latest(2).unwrap(),
            [record(3), record(4)].concat()
        );
        // Clipped, not padded, even when the byte size would overflow u64.
        assert_eq!(ring.get_first(100).unwrap().len(), 16);
        assert_eq!(ring.get_first(u64::MAX).unwrap().len(), 16);
        assert_eq!(ring.get_latest(u64::MAX).unwrap().len(), 16);
        assert!(ring.get_first(0).is_err());
        assert!(ring.get_latest(0).is_err());
    }

    #[test]
    fn sequential_read_and_end_of_stream() {
        let mut ring = ring(8);
        ring.write(&record(1)).unwrap();
        ring.write(&record(2)).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(ring.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1; 4]);
        assert_eq!(ring.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [2; 4]);
        assert_eq!(ring.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn read_follows_rollover() {
        let mut ring = ring(3);
        for i in 1..=3u8 {
            ring.write(&record(i)).unwrap();
        }
        let mut buf = [0u8; 4];
        ring.read(&mut buf).unwrap();
        assert_eq!(buf, [1; 4]);

        // Two more records push out 1 and 2; the cursor follows the
        // record it had reached.
        ring.write(&record(4)).unwrap();
        ring.write(&record(5)).unwrap();
        ring.read(&mut buf).unwrap();
        assert_eq!(buf, [3; 4]);
    }

    #[test]
    fn seek_clamps() {
        let mut ring = ring(8);
        for i in 1..=4u8 {
            ring.write(&record(i)).unwrap();
        }

        assert_eq!(ring.seek(SeekFrom::End(0)).unwrap(), 16);
        let mut buf = [0u8; 4];
        assert_eq!(ring.read(&mut buf).unwrap(), 0);

        assert_eq!(ring.seek(SeekFrom::End(-4)).unwrap(), 12);
        ring.read(&mut buf).unwrap();
        assert_eq!(buf, [4; 4]);

        assert_eq!(ring.seek(SeekFrom::Start(9999)).unwrap(), 16);
        assert_eq!(ring.seek(SeekFrom::Current(-9999)).unwrap(), 0);
    }

    #[test]
    fn read_buffer_smaller_than_record_is_an_error() {
        let mut ring = ring(8);
        ring.write(&record(1)).unwrap();

        // Rejected outright, never confused with end of stream.
        let mut small = [0u8; 3];
        assert!(matches!(
            ring.read(&mut small),
            Err(CoreError::InvalidOperation { .. })
        ));

        // The record is still there for a properly sized buffer.
        let mut buf = [0u8; 4];
        assert_eq!(ring.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1; 4]);
    }
}
