pub mod list_sessions;
pub mod log_stats;
pub mod sql_cancel;
pub mod storage_probe;
pub mod storage_scan;

use repro_sessions::{SelectOptions, Selection, TieBreak};

pub(crate) fn select_options(tie_break: Option<&str>) -> Result<SelectOptions, String> {
    let tie_break = match tie_break {
        Some(raw) => raw.parse::<TieBreak>()?,
        None => TieBreak::default(),
    };
    Ok(SelectOptions {
        tie_break,
        ..SelectOptions::default()
    })
}

pub(crate) fn target_line(selection: &Selection) -> String {
    match &selection.target {
        Some(target) => format!("target session: {target}"),
        None if selection.matched.is_empty() => "target session: (none)".to_owned(),
        None => format!(
            "target session: (ambiguous, {} sessions carry the marker)",
            selection.matched.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(target: Option<&str>, matched: &[&str]) -> Selection {
        Selection {
            target: target.map(str::to_owned),
            matched: matched.iter().map(|id| (*id).to_owned()).collect(),
            candidates: Vec::new(),
        }
    }

    #[test]
    fn target_line_names_the_selected_session() {
        insta::assert_snapshot!(
            target_line(&selection(Some("s2"), &["s2"])),
            @"target session: s2"
        );
    }

    #[test]
    fn target_line_tells_no_match_from_ambiguity() {
        insta::assert_snapshot!(
            target_line(&selection(None, &[])),
            @"target session: (none)"
        );
        insta::assert_snapshot!(
            target_line(&selection(None, &["s1", "s2"])),
            @"target session: (ambiguous, 2 sessions carry the marker)"
        );
    }

    #[test]
    fn tie_break_defaults_to_last() {
        let options = select_options(None).expect("default options");
        assert_eq!(options.tie_break, TieBreak::Last);
        assert_eq!(options, SelectOptions::default());
    }

    #[test]
    fn unknown_tie_break_is_rejected() {
        let err = select_options(Some("random")).expect_err("not a tie-break");
        assert!(err.contains("random"), "{err}");
    }
}
