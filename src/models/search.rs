//! The value returned by a company search.

use serde::{Deserialize, Serialize};

use super::{Candidate, TableData};

/// Outcome of one search: ranked candidates, the chosen company and its
/// performance tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub candidates: Vec<Candidate>,
    pub selected: Option<Candidate>,
    pub performance_tables: Vec<TableData>,
}
