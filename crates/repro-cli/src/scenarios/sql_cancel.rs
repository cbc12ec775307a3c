use std::time::Duration;

use repro_sessions::{CancelConfig, CancelReport, run_cancel_repro};
use tracing::info;

use super::{select_options, target_line};
use crate::Config;

pub async fn run(
    cfg: &Config,
    warmup_secs: Option<u64>,
    inspect_pause_secs: Option<u64>,
    tie_break: Option<&str>,
) -> Result<(), String> {
    let defaults = CancelConfig::default();
    let config = CancelConfig {
        database_url: cfg.database_url.clone(),
        warmup: warmup_secs.map_or(defaults.warmup, Duration::from_secs),
        inspect_pause: inspect_pause_secs.map_or(defaults.inspect_pause, Duration::from_secs),
        select: select_options(tie_break)?,
        ..defaults
    };

    info!(
        inspect_pause_secs = config.inspect_pause.as_secs(),
        tie_break = %config.select.tie_break,
        "starting session-cancel reproduction"
    );
    let report = run_cancel_repro(&config, cfg.debug)
        .await
        .map_err(|e| e.to_string())?;

    println!("{}", outcome_line(&report));
    match report.load_outcome {
        Ok(rounds) => println!("heartbeat worker stopped after {rounds} rounds"),
        Err(e) => println!("heartbeat worker ended: {e}"),
    }
    Ok(())
}

fn outcome_line(report: &CancelReport) -> String {
    match &report.selection.target {
        Some(target) if report.cancelled => format!("cancelled session {target}"),
        _ => format!("{}; nothing cancelled", target_line(&report.selection)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repro_sessions::Selection;

    fn report(target: Option<&str>, matched: &[&str], cancelled: bool) -> CancelReport {
        CancelReport {
            selection: Selection {
                target: target.map(str::to_owned),
                matched: matched.iter().map(|id| (*id).to_owned()).collect(),
                candidates: Vec::new(),
            },
            cancelled,
            load_outcome: Ok(4),
        }
    }

    #[test]
    fn cancelled_target_is_named() {
        insta::assert_snapshot!(
            outcome_line(&report(Some("s2"), &["s2"], true)),
            @"cancelled session s2"
        );
    }

    #[test]
    fn rejected_tie_is_reported_as_ambiguous() {
        insta::assert_snapshot!(
            outcome_line(&report(None, &["s1", "s2"], false)),
            @"target session: (ambiguous, 2 sessions carry the marker); nothing cancelled"
        );
    }

    #[test]
    fn missing_heartbeat_is_reported_as_none() {
        insta::assert_snapshot!(
            outcome_line(&report(None, &[], false)),
            @"target session: (none); nothing cancelled"
        );
    }
}
