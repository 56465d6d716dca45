//! Per-frame snapshots of a rendered page.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::HtmlDocument;

/// What the driver managed to read from one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutcome {
    Loaded { html: String },
    Skipped { reason: String },
}

/// One frame of a page, in frame-tree order (index 0 is the main frame).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub index: usize,
    pub url: String,
    pub outcome: FrameOutcome,
}

impl FrameSnapshot {
    pub fn loaded(index: usize, url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            outcome: FrameOutcome::Loaded { html: html.into() },
        }
    }

    pub fn skipped(index: usize, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            outcome: FrameOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }
}

/// A frame whose document could be read.
pub struct FrameDocument {
    pub index: usize,
    pub document: HtmlDocument,
}

impl FrameDocument {
    /// Parse every loaded snapshot; skipped frames are logged and dropped.
    pub fn parse_all(snapshots: &[FrameSnapshot]) -> Vec<FrameDocument> {
        snapshots
            .iter()
            .filter_map(|snapshot| match &snapshot.outcome {
                FrameOutcome::Loaded { html } => Some(FrameDocument {
                    index: snapshot.index,
                    document: HtmlDocument::parse(snapshot.url.clone(), html),
                }),
                FrameOutcome::Skipped { reason } => {
                    debug!("Skipping frame {} ({}): {}", snapshot.index, snapshot.url, reason);
                    None
                }
            })
            .collect()
    }
}
