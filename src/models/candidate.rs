//! Company candidates surfaced from a search results page.

use serde::{Deserialize, Serialize};

/// A possible company match with its relevance score.
///
/// Identity for deduplication is `(name, row_text)`; see [`Candidate::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Normalized link text.
    pub name: String,
    /// Normalized text of the surrounding table row (empty for bare anchors).
    pub row_text: String,
    /// Normalized title of the table the link was found in.
    pub table_title: String,
    /// Lexical match score against the search keyword.
    pub match_score: u32,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        row_text: impl Into<String>,
        table_title: impl Into<String>,
        match_score: u32,
    ) -> Self {
        Self {
            name: name.into(),
            row_text: row_text.into(),
            table_title: table_title.into(),
            match_score,
        }
    }

    /// Deduplication key.
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.row_text)
    }
}
