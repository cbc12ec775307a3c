use std::path::Path;

use repro_types::{ReproError, safe_string};
use rocksdb::{DB, Options, WriteOptions};
use tracing::info;

pub const PROBE_KEY: &[u8] = b"hello";
pub const PROBE_VALUE: &[u8] = b"world";

/// Put [`PROBE_KEY`] with a synced write and read it back, creating the
/// store if `dir` is empty. Returns the rendered key and value.
pub fn probe_write(dir: &Path) -> Result<(String, String), ReproError> {
    let mut opts = Options::default();
    opts.create_if_missing(true);
    let db = DB::open(&opts, dir).map_err(|e| ReproError::engine("open engine", e))?;

    let mut write_opts = WriteOptions::default();
    write_opts.set_sync(true);
    db.put_opt(PROBE_KEY, PROBE_VALUE, &write_opts)
        .map_err(|e| ReproError::engine("write probe key", e))?;

    let value = db
        .get_pinned(PROBE_KEY)
        .map_err(|e| ReproError::engine("read probe key", e))?
        .ok_or_else(|| ReproError::engine("read probe key", "key vanished after a synced put"))?;
    let rendered = (safe_string(PROBE_KEY), safe_string(&value));
    info!(dir = %dir.display(), "probe write read back");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScanFilter, scan_store};
    use repro_debug::DebugLog;

    #[test]
    fn probe_round_trips_and_is_visible_to_the_scanner() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (key, value) = probe_write(tmp.path()).expect("probe");
        assert_eq!((key.as_str(), value.as_str()), ("hello", "world"));

        let filter = ScanFilter {
            marker: "world".to_owned(),
            ..ScanFilter::default()
        };
        let mut hits = Vec::new();
        let summary = scan_store(tmp.path(), &filter, DebugLog::disabled(), |hit| {
            hits.push(hit.clone())
        })
        .expect("scan after probe");
        assert_eq!(summary.visited, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "hello");
    }

    #[test]
    fn probe_is_idempotent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        probe_write(tmp.path()).expect("first probe");
        let second = probe_write(tmp.path()).expect("second probe");
        assert_eq!(second, ("hello".to_owned(), "world".to_owned()));
    }
}
