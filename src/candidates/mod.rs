//! Company candidate resolution.
//!
//! Candidates are harvested from every readable frame with the table-row
//! strategy first; the bare-anchor strategy only runs when the first one
//! found nothing anywhere. Results are merged, ranked and filtered by
//! [`CandidateSet`], then [`select_candidate`] picks the target.

mod rank;
mod select;
mod strategies;

pub use rank::{compare_rank, CandidateSet};
pub use select::select_candidate;
pub use strategies::{anchor_candidates, table_row_candidates, KeywordMatcher, Strategy};

use tracing::debug;

use crate::config::CandidateRules;
use crate::document::FrameDocument;
use crate::models::Candidate;

/// Extract, merge and rank candidates across all frames of a page.
///
/// A frame that fails to answer a query contributes nothing; the other
/// frames still count.
pub fn harvest_candidates(
    frames: &[FrameDocument],
    keyword: &str,
    rules: &CandidateRules,
) -> Vec<Candidate> {
    let mut set = CandidateSet::default();

    for strategy in [Strategy::TableRows, Strategy::Anchors] {
        if !set.is_empty() {
            break;
        }
        for frame in frames {
            match strategy.extract(&frame.document, keyword, rules) {
                Ok(found) => {
                    debug!(
                        "{:?} strategy found {} candidates in frame {}",
                        strategy,
                        found.len(),
                        frame.index
                    );
                    set.extend(found);
                }
                Err(e) => debug!(
                    "{:?} strategy skipped frame {}: {}",
                    strategy, frame.index, e
                ),
            }
        }
    }

    set.into_ranked(keyword, rules.max_candidates)
}
