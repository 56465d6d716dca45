//! Tables harvested from a company detail page.

use serde::{Deserialize, Serialize};

/// One table found in a frame, with normalized text content.
///
/// Never constructed with zero rows: empty tables are dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// URL of the frame document the table came from.
    pub frame_url: String,
}

impl TableData {
    /// Title for display, falling back to a positional label.
    pub fn display_title(&self, position: usize) -> String {
        if self.title.is_empty() {
            format!("Table {}", position)
        } else {
            self.title.clone()
        }
    }
}
