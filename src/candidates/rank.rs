//! Deduplication and ranking of raw candidate emissions.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::Candidate;
use crate::text::{char_len, fold};

/// Candidates keyed by `(name, row_text)`, keeping the best-scoring emission.
///
/// Insertion order is preserved so that equal-score collisions keep the
/// first emission seen.
#[derive(Debug, Default)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
    index: HashMap<(String, String), usize>,
}

impl CandidateSet {
    pub fn insert(&mut self, candidate: Candidate) {
        if candidate.name.is_empty() {
            return;
        }

        let (name, row_text) = candidate.key();
        let key = (name.to_string(), row_text.to_string());
        match self.index.get(&key) {
            Some(&pos) => {
                if candidate.match_score > self.entries[pos].match_score {
                    self.entries[pos] = candidate;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(candidate);
            }
        }
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = Candidate>) {
        for candidate in candidates {
            self.insert(candidate);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Rank, cap and filter.
    ///
    /// With a non-empty keyword only candidates scoring above zero survive;
    /// an empty result then means "nothing matched".
    pub fn into_ranked(self, keyword: &str, limit: usize) -> Vec<Candidate> {
        let mut ranked = self.entries;
        ranked.sort_by(compare_rank);

        if !fold(keyword).is_empty() {
            ranked.retain(|c| c.match_score > 0);
        }
        ranked.truncate(limit);
        ranked
    }
}

/// Ranking order: score, then row context length, then name, all descending.
///
/// Row text breaks the remaining ties so the order is total.
pub fn compare_rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| char_len(&b.row_text).cmp(&char_len(&a.row_text)))
        .then_with(|| b.name.cmp(&a.name))
        .then_with(|| b.row_text.cmp(&a.row_text))
}
