use std::path::Path;

use repro_debug::{DebugLog, debug_print};
use repro_types::{KvEntry, ReproError, ScanHit};
use rocksdb::{DB, Options};
use tracing::info;

pub const DEFAULT_STORE_DIR: &str = "/home/xiaochen/data/cockroachdb-data";
pub const DEFAULT_MARKER: &str = "xiaochen_debug_insert";
pub const DEFAULT_MAX_VALUE_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanFilter {
    pub marker: String,
    /// Rendered values at or above this length are skipped even when they
    /// carry the marker.
    pub max_value_len: usize,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        }
    }
}

impl ScanFilter {
    pub fn matches(&self, rendered_value: &str) -> bool {
        rendered_value.contains(&self.marker) && rendered_value.len() < self.max_value_len
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub column_families: usize,
    pub visited: u64,
    pub hits: u64,
}

/// Scan every entry of the engine at `dir` through one snapshot.
///
/// The engine is opened read-only with default options, so a missing or
/// uninitialised directory fails before any snapshot or iterator exists.
/// A store without a single entry is reported as an error. Snapshot and
/// iterators are released on every path; the iterator status is checked
/// once per column family after it is exhausted.
pub fn scan_store(
    dir: &Path,
    filter: &ScanFilter,
    debug: DebugLog,
    mut on_hit: impl FnMut(&ScanHit),
) -> Result<ScanSummary, ReproError> {
    let opts = Options::default();
    let column_families =
        DB::list_cf(&opts, dir).map_err(|e| ReproError::engine("open engine", e))?;
    let db = DB::open_cf_for_read_only(&opts, dir, &column_families, false)
        .map_err(|e| ReproError::engine("open engine", e))?;
    info!(dir = %dir.display(), column_families = column_families.len(), "engine opened");

    let snapshot = db.snapshot();
    let mut summary = ScanSummary {
        column_families: column_families.len(),
        ..ScanSummary::default()
    };

    for name in &column_families {
        let cf = db.cf_handle(name).ok_or_else(|| {
            ReproError::engine("open column family", format!("`{name}` has no handle"))
        })?;
        let mut iter = snapshot.raw_iterator_cf(cf);
        iter.seek_to_first();
        if !iter.valid() {
            iter.status()
                .map_err(|e| ReproError::engine("position iterator at first entry", e))?;
            debug_print!(debug, "column family {name} is empty");
        }

        while iter.valid() {
            let (Some(key), Some(value)) = (iter.key(), iter.value()) else {
                break;
            };
            summary.visited += 1;
            let entry = KvEntry::new(key, value);
            let rendered = entry.rendered_value();
            if filter.matches(&rendered) {
                summary.hits += 1;
                on_hit(&ScanHit {
                    index: summary.visited,
                    key: entry.rendered_key(),
                    value: rendered,
                });
            }
            iter.next();
        }

        iter.status()
            .map_err(|e| ReproError::close("snapshot iterator", e))?;
        debug_print!(debug, "column family {name} done after {} entries", summary.visited);
    }

    if summary.visited == 0 {
        return Err(ReproError::engine(
            "position iterator at first entry",
            "store has no entries",
        ));
    }

    info!(
        visited = summary.visited,
        hits = summary.hits,
        "snapshot scan finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repro_types::ErrorKind;

    fn seed(dir: &Path, entries: &[(&[u8], &[u8])]) {
        let db = DB::open_default(dir).expect("open seed db");
        for (key, value) in entries {
            db.put(key, value).expect("seed put");
        }
        db.flush().expect("seed flush");
    }

    fn collect(dir: &Path, filter: &ScanFilter) -> Result<(ScanSummary, Vec<String>), ReproError> {
        let mut lines = Vec::new();
        let summary = scan_store(dir, filter, DebugLog::disabled(), |hit| {
            lines.push(hit.to_string())
        })?;
        Ok((summary, lines))
    }

    #[test]
    fn missing_directory_fails_before_any_entry() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let missing = tmp.path().join("no-such-store");
        let mut called = false;
        let err = scan_store(&missing, &ScanFilter::default(), DebugLog::disabled(), |_| {
            called = true
        })
        .expect_err("nothing to open");
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert!(!called);
        assert!(!missing.exists(), "scanner must not create the directory");
    }

    #[test]
    fn reports_short_marker_values_with_running_index() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let long_value = format!("xiaochen_debug_insert{}", "z".repeat(120));
        seed(
            tmp.path(),
            &[
                (b"a/1", b"plain"),
                (b"a/2", b"xiaochen_debug_insert\x01"),
                (b"b/1", long_value.as_bytes()),
                (b"b/2\xff", b"row=xiaochen_debug_insert"),
            ],
        );

        let (summary, lines) = collect(tmp.path(), &ScanFilter::default()).expect("scan");
        assert_eq!(summary.visited, 4);
        assert_eq!(summary.hits, 2);
        assert_eq!(
            lines,
            vec![
                r"[2] key: a/2, value: xiaochen_debug_insert\x01".to_owned(),
                r"[4] key: b/2\xff, value: row=xiaochen_debug_insert".to_owned(),
            ]
        );
    }

    #[test]
    fn values_are_rendered_display_safe() {
        let tmp = tempfile::tempdir().expect("tempdir");
        seed(tmp.path(), &[(b"k", &[0x78, 0x01, 0x79])]);
        let filter = ScanFilter {
            marker: "x".to_owned(),
            ..ScanFilter::default()
        };
        let (_, lines) = collect(tmp.path(), &filter).expect("scan");
        assert_eq!(lines, vec![r"[1] key: k, value: x\x01y".to_owned()]);
    }

    #[test]
    fn empty_store_is_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        seed(tmp.path(), &[]);
        let err = collect(tmp.path(), &ScanFilter::default()).expect_err("empty store");
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn every_column_family_is_scanned() {
        let tmp = tempfile::tempdir().expect("tempdir");
        {
            let mut opts = Options::default();
            opts.create_if_missing(true);
            opts.create_missing_column_families(true);
            let db = DB::open_cf(&opts, tmp.path(), ["meta"]).expect("open cf db");
            db.put(b"default-key", b"xiaochen_debug_insert:default")
                .expect("put default");
            let meta = db.cf_handle("meta").expect("meta handle");
            db.put_cf(meta, b"meta-key", b"xiaochen_debug_insert:meta")
                .expect("put meta");
            db.flush().expect("flush default");
            db.flush_cf(meta).expect("flush meta");
        }

        let (summary, lines) = collect(tmp.path(), &ScanFilter::default()).expect("scan");
        assert_eq!(summary.column_families, 2);
        assert_eq!(summary.visited, 2);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn filter_requires_marker_and_short_value() {
        let filter = ScanFilter::default();
        assert!(filter.matches("xiaochen_debug_insert"));
        assert!(!filter.matches("unrelated"));
        assert!(!filter.matches(&format!("xiaochen_debug_insert{}", "a".repeat(79))));
        assert!(filter.matches(&format!("xiaochen_debug_insert{}", "a".repeat(78))));
    }
}
