use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::Encoding;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

pub static SEL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector"));
pub static SEL_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("td selector"));

/// Read a document written in a legacy encoding and parse it
pub fn load_document(path: &Path, encoding: &'static Encoding) -> Result<Html> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(parse_document(&bytes, encoding))
}

/// Decode raw bytes and parse them as HTML
pub fn parse_document(bytes: &[u8], encoding: &'static Encoding) -> Html {
    // The export never carries a BOM, the declared encoding is authoritative
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    Html::parse_document(&text)
}

/// Text of an element: every text node trimmed, blanks dropped, the rest
/// joined with `sep`
pub fn flat_text(element: ElementRef, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Text of the `n`-th cell found anywhere in `table`, empty if there is none
pub fn nth_cell(table: ElementRef, n: usize) -> String {
    table
        .select(&SEL_TD)
        .nth(n)
        .map(|cell| flat_text(cell, ""))
        .unwrap_or_default()
}

/// Width of a cell in columns.
///
/// A missing, unparseable or non-positive `colspan` counts as one column.
pub fn colspan(cell: ElementRef) -> u32 {
    match cell.value().attr("colspan") {
        None => 1,
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(span) if span > 0 => span,
            _ => {
                tracing::debug!(colspan = raw, "unusable colspan, counting one column");
                1
            }
        },
    }
}

/// Element children of `element` with the given tag name
pub fn children_named<'a>(
    element: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}
