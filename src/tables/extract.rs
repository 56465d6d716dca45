//! Table harvesting from a single document.

use crate::config::TableRules;
use crate::document::{DocumentError, DomQuery};
use crate::models::TableData;
use crate::text::{char_len, normalize};

/// Normalized caption text, if the table has a non-empty caption.
pub fn caption_title<'a, D: DomQuery>(
    doc: &'a D,
    table: D::Node<'a>,
) -> Result<Option<String>, DocumentError> {
    Ok(doc
        .first_within(table, "caption")?
        .map(|caption| normalize(&doc.text(caption)))
        .filter(|text| !text.is_empty()))
}

/// Heading or emphasis text from the section enclosing the table.
pub fn section_heading_title<'a, D: DomQuery>(
    doc: &'a D,
    table: D::Node<'a>,
) -> Result<Option<String>, DocumentError> {
    let Some(section) = doc.closest(table, "section, article, div")? else {
        return Ok(None);
    };
    Ok(doc
        .first_within(section, "h1, h2, h3, h4, strong")?
        .map(|heading| normalize(&doc.text(heading)))
        .filter(|text| !text.is_empty()))
}

/// Text of the nearest preceding sibling that has text, if short enough.
///
/// Siblings with text longer than `max_chars` are passed over and the
/// search continues further back.
pub fn preceding_sibling_title<'a, D: DomQuery>(
    doc: &'a D,
    node: D::Node<'a>,
    max_chars: usize,
) -> Option<String> {
    doc.previous_siblings(node)
        .into_iter()
        .map(|sibling| normalize(&doc.text(sibling)))
        .find(|text| !text.is_empty() && char_len(text) <= max_chars)
}

/// Every table in the document that has at least one non-empty row.
pub fn extract_tables<D: DomQuery>(
    doc: &D,
    frame_url: &str,
    rules: &TableRules,
) -> Result<Vec<TableData>, DocumentError> {
    let mut out = Vec::new();

    for table in doc.select("table")? {
        let rows = table_rows(doc, table)?;
        if rows.is_empty() {
            continue;
        }

        let headers = doc
            .select_within(table, "thead th")?
            .into_iter()
            .map(|th| normalize(&doc.text(th)))
            .filter(|h| !h.is_empty())
            .collect();

        out.push(TableData {
            title: infer_title(doc, table, rules.max_title_chars)?,
            headers,
            rows,
            frame_url: frame_url.to_string(),
        });
    }

    Ok(out)
}

fn infer_title<'a, D: DomQuery>(
    doc: &'a D,
    table: D::Node<'a>,
    max_chars: usize,
) -> Result<String, DocumentError> {
    if let Some(caption) = caption_title(doc, table)? {
        return Ok(caption);
    }
    if let Some(heading) = section_heading_title(doc, table)? {
        return Ok(heading);
    }
    Ok(preceding_sibling_title(doc, table, max_chars).unwrap_or_default())
}

fn table_rows<'a, D: DomQuery>(
    doc: &'a D,
    table: D::Node<'a>,
) -> Result<Vec<Vec<String>>, DocumentError> {
    let mut rows = doc.select_within(table, "tbody tr")?;
    if rows.is_empty() {
        rows = doc.select_within(table, "tr")?;
    }

    let mut out = Vec::new();
    for row in rows {
        let cells: Vec<String> = doc
            .select_within(row, "th, td")?
            .into_iter()
            .map(|cell| normalize(&doc.text(cell)))
            .collect();
        if cells.iter().any(|cell| !cell.is_empty()) {
            out.push(cells);
        }
    }
    Ok(out)
}
