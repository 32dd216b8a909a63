use regex::Regex;
use scraper::ElementRef;

use crate::error::{Error, Result};
use crate::format::Markers;
use crate::timetable::models::Metadata;
use crate::utils::flat_text;

/// Value used when a header field can't be found
pub const UNKNOWN: &str = "Unknown";

/// Fields read from a header table, `None` when the marker is missing
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub class_groups: Option<String>,
    pub dept: Option<String>,
}

/// Compiled form of the header markers
pub struct HeaderParser {
    class_marker: String,
    class: Regex,
    dept: Regex,
}

impl HeaderParser {
    pub fn new(markers: &Markers) -> Result<Self> {
        Ok(Self {
            class_marker: markers.class.clone(),
            class: between(&markers.class, &markers.department)?,
            dept: between(&markers.department, &markers.contact)?,
        })
    }

    /// Split flattened header text into its class and department
    pub fn parse(&self, text: &str) -> Header {
        let field = |re: &Regex| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_owned())
        };

        Header {
            class_groups: field(&self.class),
            dept: field(&self.dept),
        }
    }

    /// Metadata of the grid that follows `preceding`.
    ///
    /// `preceding` holds every table that opens before the grid, in document
    /// order, so the search starts from its end.
    pub fn info(&self, preceding: &[ElementRef]) -> Metadata {
        let header = preceding
            .iter()
            .rev()
            .find(|table| table.text().collect::<String>().contains(&self.class_marker))
            .map(|table| self.parse(&flat_text(*table, " ")))
            .unwrap_or_default();

        if header.class_groups.is_none() {
            tracing::debug!("no class header before grid");
        }

        Metadata {
            class_groups: header.class_groups.unwrap_or_else(|| UNKNOWN.to_owned()),
            dept: header.dept.unwrap_or_else(|| UNKNOWN.to_owned()),
        }
    }
}

/// Text after the first `start`, up to the next `start` or `end`
fn between(start: &str, end: &str) -> Result<Regex> {
    let (start, end) = (regex::escape(start), regex::escape(end));
    Regex::new(&format!("(?s){start}(.*?)(?:{start}|{end}|$)"))
        .map_err(|e| Error::format(format!("header markers: {e}")))
}
