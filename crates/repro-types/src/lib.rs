//! Shared records and error kinds for the repro tools.
//!
//! Nothing in here talks to a database or opens a file: the types are the
//! common currency between the session tooling in `repro-sessions`, the
//! storage scanner in `repro-store`, and the `repro` binary that prints them.

mod error;
mod kv;
mod session;

pub use error::{ErrorKind, ReproError};
pub use kv::{KvEntry, ScanHit, safe_string};
pub use session::SessionRecord;
