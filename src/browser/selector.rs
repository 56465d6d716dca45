//! Selector strings with an optional text filter.

use serde::{Deserialize, Serialize};

use crate::text::normalize;

const HAS_TEXT: &str = ":has-text(";

/// A CSS selector, optionally restricted to elements whose text contains a
/// fragment. Written as `css:has-text('fragment')`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSpec {
    /// The string as configured.
    pub raw: String,
    pub css: String,
    pub text: Option<String>,
}

impl SelectorSpec {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some((css, text)) = split_has_text(trimmed) {
            return Self {
                raw: trimmed.to_string(),
                css: if css.is_empty() { "*".to_string() } else { css.to_string() },
                text: Some(text),
            };
        }
        Self {
            raw: trimmed.to_string(),
            css: trimmed.to_string(),
            text: None,
        }
    }

    /// Whether rendered element text satisfies the text filter.
    pub fn matches_text(&self, element_text: &str) -> bool {
        match &self.text {
            Some(fragment) => normalize(element_text).contains(fragment.as_str()),
            None => true,
        }
    }
}

fn split_has_text(raw: &str) -> Option<(&str, String)> {
    let start = raw.rfind(HAS_TEXT)?;
    let inner = raw[start + HAS_TEXT.len()..].strip_suffix(')')?;
    let inner = inner.trim();
    let unquoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(inner);
    Some((raw[..start].trim(), normalize(unquoted)))
}
