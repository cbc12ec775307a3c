use repro_debug::raw_print;
use repro_store::{ScanFilter, scan_store};
use repro_types::ScanHit;

use crate::Config;

pub async fn run(
    cfg: &Config,
    marker: Option<String>,
    max_value_len: Option<usize>,
) -> Result<(), String> {
    let defaults = ScanFilter::default();
    let filter = ScanFilter {
        marker: marker.unwrap_or(defaults.marker),
        max_value_len: max_value_len.unwrap_or(defaults.max_value_len),
    };
    let dir = cfg.store_dir.clone();
    let debug = cfg.debug;
    let json = cfg.json;

    let summary = tokio::task::spawn_blocking(move || {
        let mut encode_error = None;
        let summary = scan_store(&dir, &filter, debug, |hit| {
            if encode_error.is_some() {
                return;
            }
            match render_hit(hit, json) {
                Ok(line) => println!("{line}"),
                Err(e) => encode_error = Some(e),
            }
        })
        .map_err(|e| e.to_string())?;
        match encode_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    })
    .await
    .map_err(|e| format!("storage scan task failed: {e}"))??;

    raw_print!(
        cfg.debug,
        "column families: {}, entries: {}",
        summary.column_families,
        summary.visited
    );

    if !json {
        println!(
            "scanned {} entries, {} matched",
            summary.visited, summary.hits
        );
    }
    Ok(())
}

fn render_hit(hit: &ScanHit, json: bool) -> Result<String, String> {
    if json {
        facet_json::to_string(hit).map_err(|e| format!("encode scan hit: {e}"))
    } else {
        Ok(hit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_hits_use_the_indexed_line_format() {
        let hit = ScanHit {
            index: 3,
            key: "k".to_owned(),
            value: r"xiaochen_debug_insert\x00".to_owned(),
        };
        insta::assert_snapshot!(
            render_hit(&hit, false).expect("text render"),
            @r"[3] key: k, value: xiaochen_debug_insert\x00"
        );
    }
}
