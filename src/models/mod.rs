//! Data models for sminfo search results.

mod candidate;
mod search;
mod table;

pub use candidate::Candidate;
pub use search::SearchResult;
pub use table::TableData;
