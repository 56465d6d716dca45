//! Performance table harvesting and relevance ranking.

mod extract;
mod score;

pub use extract::{caption_title, extract_tables, preceding_sibling_title, section_heading_title};
pub use score::{rank_tables, TableScorer};

use tracing::debug;

use crate::document::FrameDocument;
use crate::models::TableData;

/// Harvest every non-empty table across frames, then rank them.
///
/// Frames that fail to answer a query are skipped. When at least one table
/// has rows the result is never empty.
pub fn harvest_tables(frames: &[FrameDocument], scorer: &TableScorer) -> Vec<TableData> {
    let mut all = Vec::new();

    for frame in frames {
        match extract_tables(&frame.document, frame.document.url(), scorer.rules()) {
            Ok(tables) => {
                debug!("Found {} tables in frame {}", tables.len(), frame.index);
                all.extend(tables);
            }
            Err(e) => debug!("Table extraction skipped frame {}: {}", frame.index, e),
        }
    }

    rank_tables(all, scorer)
}
