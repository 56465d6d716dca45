//! [`DomQuery`] over a parsed HTML snapshot.

use scraper::{ElementRef, Html, Node, Selector};

use super::{DocumentError, DomQuery};

/// Elements whose content never renders as text.
const NON_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that separate text the way a line break or cell boundary does.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "br", "caption", "dd", "div", "dl", "dt", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "nav", "ol", "option", "p", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// A parsed frame document.
pub struct HtmlDocument {
    url: String,
    html: Html,
}

impl HtmlDocument {
    pub fn parse(url: impl Into<String>, source: &str) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(source),
        }
    }

    /// URL of the frame this document was captured from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Rendered text of `<body>`, or of the whole document when there is none.
    pub fn body_text(&self) -> String {
        match self.select("body").ok().and_then(|b| b.into_iter().next()) {
            Some(body) => self.text(body),
            None => element_text(self.html.root_element()),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DocumentError> {
    Selector::parse(selector).map_err(|e| DocumentError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if NON_TEXT_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push(' ');
            }
            push_text(child_element, out);
            if block {
                out.push(' ');
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

impl DomQuery for HtmlDocument {
    type Node<'a> = ElementRef<'a>;

    fn select<'a>(&'a self, selector: &str) -> Result<Vec<ElementRef<'a>>, DocumentError> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    fn select_within<'a>(
        &'a self,
        scope: ElementRef<'a>,
        selector: &str,
    ) -> Result<Vec<ElementRef<'a>>, DocumentError> {
        let selector = parse_selector(selector)?;
        Ok(scope.select(&selector).collect())
    }

    fn text<'a>(&'a self, node: ElementRef<'a>) -> String {
        element_text(node)
    }

    fn attribute<'a>(&'a self, node: ElementRef<'a>, key: &str) -> Option<String> {
        node.value().attr(key).map(str::to_string)
    }

    fn previous_siblings<'a>(&'a self, node: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        node.prev_siblings().filter_map(ElementRef::wrap).collect()
    }

    fn closest<'a>(
        &'a self,
        node: ElementRef<'a>,
        selector: &str,
    ) -> Result<Option<ElementRef<'a>>, DocumentError> {
        let selector = parse_selector(selector)?;
        Ok(std::iter::once(node)
            .chain(node.ancestors().filter_map(ElementRef::wrap))
            .find(|element| selector.matches(element)))
    }
}
