//! Read-only query capability over a rendered document.
//!
//! The heuristics in [`crate::candidates`] and [`crate::tables`] are written
//! against [`DomQuery`] only. [`HtmlDocument`] implements it over a parsed
//! frame snapshot; tests implement nothing else, they just feed HTML.

mod frames;
mod html;

pub use frames::{FrameDocument, FrameOutcome, FrameSnapshot};
pub use html::HtmlDocument;

use thiserror::Error;

/// Errors raised by document queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Tree-query capability over one document.
///
/// Node handles are cheap copies borrowed from the document.
pub trait DomQuery {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// All elements matching `selector`, in document order.
    fn select<'a>(&'a self, selector: &str) -> Result<Vec<Self::Node<'a>>, DocumentError>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn select_within<'a>(
        &'a self,
        scope: Self::Node<'a>,
        selector: &str,
    ) -> Result<Vec<Self::Node<'a>>, DocumentError>;

    /// Rendered text of a node (not normalized).
    fn text<'a>(&'a self, node: Self::Node<'a>) -> String;

    fn attribute<'a>(&'a self, node: Self::Node<'a>, key: &str) -> Option<String>;

    /// Preceding element siblings, nearest first.
    fn previous_siblings<'a>(&'a self, node: Self::Node<'a>) -> Vec<Self::Node<'a>>;

    /// Nearest ancestor-or-self matching `selector`.
    fn closest<'a>(
        &'a self,
        node: Self::Node<'a>,
        selector: &str,
    ) -> Result<Option<Self::Node<'a>>, DocumentError>;

    /// First element matching `selector` within `scope`.
    fn first_within<'a>(
        &'a self,
        scope: Self::Node<'a>,
        selector: &str,
    ) -> Result<Option<Self::Node<'a>>, DocumentError> {
        Ok(self.select_within(scope, selector)?.into_iter().next())
    }
}
