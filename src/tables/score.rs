//! Financial relevance scoring for harvested tables.

use regex::Regex;
use tracing::debug;

use crate::config::TableRules;
use crate::models::TableData;

/// Scores tables on lexical and structural signals.
pub struct TableScorer {
    rules: TableRules,
    year: Regex,
}

impl TableScorer {
    pub fn new(rules: TableRules) -> Result<Self, regex::Error> {
        let year = Regex::new(&rules.year_pattern)?;
        Ok(Self { rules, year })
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    /// Relevance score: year token, domain keywords, header and row counts.
    pub fn score(&self, table: &TableData) -> u32 {
        let mut parts: Vec<&str> = Vec::new();
        parts.push(&table.title);
        parts.extend(table.headers.iter().map(String::as_str));
        for row in table.rows.iter().take(self.rules.rows_scanned) {
            parts.extend(row.iter().map(String::as_str));
        }
        let blob = parts.join(" ");

        let mut score = 0;
        if self.year.is_match(&blob) {
            score += self.rules.year_score;
        }
        for keyword in &self.rules.financial_keywords {
            if !keyword.is_empty() && blob.contains(keyword.as_str()) {
                score += self.rules.keyword_score;
            }
        }
        if table.headers.len() >= 2 {
            score += 1;
        }
        if table.rows.len() >= 2 {
            score += 1;
        }
        score
    }
}

/// Keep the relevant tables, best first; fall back to the top few by raw
/// score when none is relevant.
pub fn rank_tables(tables: Vec<TableData>, scorer: &TableScorer) -> Vec<TableData> {
    let rules = scorer.rules();
    let mut scored: Vec<(u32, TableData)> = tables
        .into_iter()
        .map(|table| (scorer.score(&table), table))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    for (score, table) in &scored {
        debug!("Table '{}' scored {}", table.title, score);
    }

    let relevant = scored
        .iter()
        .filter(|(score, _)| *score >= rules.min_relevant_score)
        .count();

    let keep = if relevant > 0 {
        relevant.min(rules.max_tables)
    } else {
        debug!("No table reached the relevance threshold, returning the best guesses");
        rules.fallback_tables
    };

    scored.into_iter().take(keep).map(|(_, table)| table).collect()
}
