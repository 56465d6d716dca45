//! Shared helper functions for CLI commands.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use sminfo::models::SearchResult;

/// Candidates listed in the terminal summary.
const LISTED_CANDIDATES: usize = 10;

pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message(message);
    pb
}

/// Human-readable summary of a search result.
pub fn format_summary(result: &SearchResult, show_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Query: {}", result.query);
    let _ = writeln!(out, "Candidates: {}", result.candidates.len());

    if !result.candidates.is_empty() {
        let _ = writeln!(out, "\nCandidate list:");
        for (idx, candidate) in result.candidates.iter().take(LISTED_CANDIDATES).enumerate() {
            let table_title = if candidate.table_title.is_empty() {
                "(untitled)"
            } else {
                candidate.table_title.as_str()
            };
            let _ = writeln!(
                out,
                "{:>2}. {}  | score={} | table={}",
                idx + 1,
                candidate.name,
                candidate.match_score,
                table_title
            );
        }
    }

    if let Some(selected) = &result.selected {
        let _ = writeln!(out, "\nSelected company: {}", selected.name);
    }

    let _ = writeln!(out, "Tables extracted: {}", result.performance_tables.len());

    for (idx, table) in result.performance_tables.iter().enumerate() {
        let _ = writeln!(out, "\n[{}] {}", idx + 1, table.display_title(idx + 1));
        if !table.headers.is_empty() {
            let _ = writeln!(out, "  {}", table.headers.join(" | "));
        }
        for row in table.rows.iter().take(show_rows) {
            let _ = writeln!(out, "  {}", row.join(" | "));
        }
        if table.rows.len() > show_rows {
            let _ = writeln!(out, "  ... {} rows more", table.rows.len() - show_rows);
        }
    }

    out
}

/// Write the result as pretty JSON, creating parent directories.
pub fn write_json(path: &Path, result: &SearchResult) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sminfo::models::{Candidate, TableData};

    fn result() -> SearchResult {
        let chosen = Candidate::new("테스트기업", "테스트기업 서울", "", 180);
        SearchResult {
            query: "테스트기업".to_string(),
            candidates: vec![chosen.clone(), Candidate::new("테스트기업 2호", "", "목록", 60)],
            selected: Some(chosen),
            performance_tables: vec![TableData {
                title: String::new(),
                headers: vec!["연도".to_string(), "매출".to_string()],
                rows: vec![
                    vec!["2023".to_string(), "100".to_string()],
                    vec!["2022".to_string(), "90".to_string()],
                    vec!["2021".to_string(), "80".to_string()],
                ],
                frame_url: "https://portal.test/".to_string(),
            }],
        }
    }

    #[test]
    fn summary_lists_candidates_and_tables() {
        let text = format_summary(&result(), 2);

        assert!(text.contains("Query: 테스트기업\nCandidates: 2\n"));
        assert!(text.contains(" 1. 테스트기업  | score=180 | table=(untitled)"));
        assert!(text.contains(" 2. 테스트기업 2호  | score=60 | table=목록"));
        assert!(text.contains("Selected company: 테스트기업"));
        assert!(text.contains("[1] Table 1\n  연도 | 매출\n  2023 | 100\n  2022 | 90\n  ... 1 rows more"));
    }

    #[test]
    fn no_footer_when_all_rows_shown() {
        let text = format_summary(&result(), 6);
        assert!(!text.contains("rows more"));
        assert!(text.contains("  2021 | 80"));
    }

    #[test]
    fn json_output_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/result.json");

        write_json(&path, &result()).unwrap();

        let back: SearchResult =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, result());
    }
}
