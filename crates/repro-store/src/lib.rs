//! Read-only inspection of an on-disk LSM engine.
//!
//! [`scan_store`] walks a consistent snapshot of every column family in
//! key order and reports the entries whose rendered value carries a debug
//! marker. [`probe_write`] is the one write path: a single synced put
//! followed by a read back, for checking that a directory is usable at all.

mod probe;
mod scan;

pub use probe::{PROBE_KEY, PROBE_VALUE, probe_write};
pub use scan::{
    DEFAULT_MARKER, DEFAULT_MAX_VALUE_LEN, DEFAULT_STORE_DIR, ScanFilter, ScanSummary, scan_store,
};
