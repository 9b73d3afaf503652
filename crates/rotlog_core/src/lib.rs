//! # rotlog Core
//!
//! A fixed-record rotating log store: a stream of equal-sized binary
//! records persisted across a bounded set of segment files, with
//! crash-consistent durability, sequential reads, positional seeks, and
//! bounded-window lookups. Built for long-running or embedded processes
//! that must keep a capped amount of recent telemetry across power loss.
//!
//! ## Stores
//!
//! - [`FileStore`] - persistent, backed by numbered segment files plus a
//!   mutable work buffer; oldest segments are evicted once the retention
//!   cap is reached.
//! - [`MemLoop`] - volatile bounded ring with the same interface, for
//!   tests and ephemeral use.
//!
//! Both implement [`RecordStore`] and are interchangeable behind it.
//!
//! ## Example
//!
//! ```no_run
//! use rotlog_core::{FileStore, FileStoreConfig, RecordStore};
//!
//! let config = FileStoreConfig::new("telemetry", "/var/lib/myapp", 8, 4, 4096);
//! let mut store = FileStore::open(config).unwrap();
//!
//! store.write(&[0u8; 16]).unwrap(); // two 8-byte records
//! assert_eq!(store.len().unwrap(), 2);
//! let newest = store.get_latest(1).unwrap();
//! assert_eq!(newest.len(), 8);
//! ```
//!
//! ## Durability model
//!
//! Files are only ever replaced whole, via a temp-write/fsync/rename
//! sequence; a crash leaves each file either fully old or fully new.
//! Every durable write is additionally read back through the decode path
//! and byte-compared before the write is reported successful.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod file;
mod memory;
mod store;

pub use config::{FileStoreConfig, MemLoopConfig};
pub use error::{CoreError, CoreResult};
pub use file::FileStore;
pub use memory::MemLoop;
pub use store::RecordStore;

// The seek origin type is std's; re-exported so callers need no extra
// imports to drive `RecordStore::seek`.
pub use std::io::SeekFrom;
