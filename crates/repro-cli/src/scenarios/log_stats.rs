use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogStats {
    pub errors: usize,
    pub warnings: usize,
}

/// Count lines mentioning `error` and `warning`, case-insensitively. A line
/// mentioning both counts towards both.
pub fn count_log_lines(text: &str) -> LogStats {
    let mut stats = LogStats::default();
    for line in text.lines() {
        let lower = line.to_lowercase();
        if lower.contains("error") {
            stats.errors += 1;
        }
        if lower.contains("warning") {
            stats.warnings += 1;
        }
    }
    stats
}

pub fn run(log_file: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(log_file)
        .map_err(|e| format!("failed to read {}: {e}", log_file.display()))?;
    let stats = count_log_lines(&text);
    println!("Errors: {}", stats.errors);
    println!("Warnings: {}", stats.warnings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_per_line_and_case_insensitive() {
        let log = "\
=== RUN   TestChangefeedBasics
ERROR: replica 3 unavailable
warning: unused variable `span`
Error and WARNING on one line
--- PASS: TestChangefeedBasics (1.02s)
";
        assert_eq!(
            count_log_lines(log),
            LogStats {
                errors: 2,
                warnings: 2
            }
        );
    }

    #[test]
    fn repeated_mentions_on_a_line_count_once() {
        let stats = count_log_lines("error error error\n");
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = run(&tmp.path().join("out")).expect_err("no such file");
        assert!(err.starts_with("failed to read"), "{err}");
    }
}
