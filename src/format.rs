//! Format profile of a timetable export.
//!
//! Everything the decoder assumes about one institution's export lives
//! here: which tables are grids, which row labels are days and where each
//! day starts on the weekly axis, and which strings delimit the class
//! header. The defaults match the stock export; a TOML file may override
//! any field.
//!
//! ```toml
//! encoding = "iso-8859-1"
//! day_span = 9.0
//! day_start = "09:00"
//!
//! [grid]
//! cellspacing = "0"
//! border = "1"
//!
//! [[days]]
//! label = "Mon"
//! offset = 0.0
//!
//! [markers]
//! class = "Class:"
//! department = "Department"
//! contact = "Contact"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::NaiveTime;
use encoding_rs::Encoding;
use scraper::node::Element;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Format {
    /// Label of the legacy encoding the document is written in.
    ///
    /// Labels resolve the WHATWG way: `iso-8859-1` decodes as windows-1252,
    /// so bytes 0x80-0x9F come out as typographic characters (`\x92` is
    /// `’`) instead of C1 control codes.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Attribute fingerprint: a table is a grid when it carries every pair.
    #[serde(default = "default_grid")]
    pub grid: BTreeMap<String, String>,

    /// Recognised day labels, in display order.
    #[serde(default = "default_days")]
    pub days: Vec<DayColumn>,

    /// Hours of grid width one day row can represent.
    #[serde(default = "default_day_span")]
    pub day_span: f64,

    /// Wall-clock time of a row's first column, `HH:MM`. Preview only.
    #[serde(default = "default_day_start")]
    pub day_start: String,

    #[serde(default)]
    pub markers: Markers,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayColumn {
    pub label: String,
    /// Hours from the start of the week.
    pub offset: f64,
}

/// Strings surrounding the class and department in a grid's header table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Markers {
    #[serde(default = "default_class_marker")]
    pub class: String,
    #[serde(default = "default_department_marker")]
    pub department: String,
    #[serde(default = "default_contact_marker")]
    pub contact: String,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            grid: default_grid(),
            days: default_days(),
            day_span: default_day_span(),
            day_start: default_day_start(),
            markers: Markers::default(),
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            class: default_class_marker(),
            department: default_department_marker(),
            contact: default_contact_marker(),
        }
    }
}

fn default_encoding() -> String {
    "iso-8859-1".into()
}
fn default_grid() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("cellspacing".into(), "0".into()),
        ("border".into(), "1".into()),
    ])
}
fn default_days() -> Vec<DayColumn> {
    [("Mon", 0.0), ("Tue", 9.0), ("Wed", 18.0), ("Thu", 27.0), ("Fri", 36.0)]
        .into_iter()
        .map(|(label, offset)| DayColumn {
            label: label.into(),
            offset,
        })
        .collect()
}
fn default_day_span() -> f64 {
    9.0
}
fn default_day_start() -> String {
    "09:00".into()
}
fn default_class_marker() -> String {
    "Class:".into()
}
fn default_department_marker() -> String {
    "Department".into()
}
fn default_contact_marker() -> String {
    "Contact".into()
}

impl Format {
    /// Read and validate a TOML profile.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let format: Self = toml::from_str(content)
            .map_err(|e| Error::format(format!("invalid profile: {e}")))?;
        format.validate()?;
        Ok(format)
    }

    pub fn validate(&self) -> Result<()> {
        self.encoding()?;
        self.day_start()?;

        if self.days.is_empty() {
            return Err(Error::format("at least one day label is required"));
        }
        let mut seen = HashSet::new();
        for day in &self.days {
            if !seen.insert(day.label.as_str()) {
                return Err(Error::format(format!("day label {:?} is listed twice", day.label)));
            }
            if !day.offset.is_finite() || day.offset < 0.0 {
                return Err(Error::format(format!(
                    "day {:?} has an invalid offset {}",
                    day.label, day.offset
                )));
            }
        }
        if !self.day_span.is_finite() || self.day_span <= 0.0 {
            return Err(Error::format("day_span must be positive"));
        }

        let markers = &self.markers;
        if [&markers.class, &markers.department, &markers.contact]
            .iter()
            .any(|m| m.is_empty())
        {
            return Err(Error::format("header markers cannot be empty"));
        }

        Ok(())
    }

    /// Decoder for the document's legacy encoding.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| Error::format(format!("unknown encoding {:?}", self.encoding)))
    }

    pub fn day_start(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.day_start.trim(), "%H:%M").map_err(|e| {
            Error::format(format!("day_start {:?} is not HH:MM: {e}", self.day_start))
        })
    }

    /// Weekly offset of a day label, if it is one.
    pub fn day_offset(&self, label: &str) -> Option<f64> {
        self.days
            .iter()
            .find(|day| day.label == label)
            .map(|day| day.offset)
    }

    /// Whether a `table` element carries the grid fingerprint.
    pub fn is_grid(&self, table: &Element) -> bool {
        self.grid
            .iter()
            .all(|(name, value)| table.attr(name) == Some(value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn defaults_match_stock_export() {
        let format = Format::default();
        assert!(format.validate().is_ok());
        assert_eq!(format.day_offset("Mon"), Some(0.0));
        assert_eq!(format.day_offset("Tue"), Some(9.0));
        assert_eq!(format.day_offset("Wed"), Some(18.0));
        assert_eq!(format.day_offset("Thu"), Some(27.0));
        assert_eq!(format.day_offset("Fri"), Some(36.0));
        assert_eq!(format.day_offset("Sat"), None);
        assert_eq!(format.day_offset("mon"), None);
        assert_eq!(format.markers.class, "Class:");
        assert_eq!(format.day_start().unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn empty_profile_uses_defaults() {
        let format = Format::from_toml("").unwrap();
        assert_eq!(format.days.len(), 5);
        assert_eq!(format.grid.get("border").map(String::as_str), Some("1"));
        assert_eq!(format.encoding, "iso-8859-1");
    }

    #[test]
    fn profile_overrides_fields() {
        let format = Format::from_toml(
            r#"
            day_span = 12.0

            [grid]
            class = "grid"

            [[days]]
            label = "Sat"
            offset = 0.0

            [markers]
            class = "Group:"
            "#,
        )
        .unwrap();
        assert_eq!(format.day_offset("Sat"), Some(0.0));
        assert_eq!(format.day_offset("Mon"), None);
        assert_eq!(format.grid.len(), 1);
        assert_eq!(format.markers.class, "Group:");
        assert_eq!(format.markers.contact, "Contact");
        assert!((format.day_span - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_bad_profiles() {
        assert!(matches!(Format::from_toml("days = []"), Err(Error::Format { .. })));
        assert!(Format::from_toml("encoding = \"klingon\"").is_err());
        assert!(Format::from_toml("day_start = \"9h\"").is_err());
        assert!(Format::from_toml("day_span = 0.0").is_err());
        assert!(Format::from_toml("unknown = 1").is_err());
        assert!(Format::from_toml("[markers]\ncontact = \"\"").is_err());
        assert!(Format::from_toml(
            "[[days]]\nlabel = \"Mon\"\noffset = 0.0\n[[days]]\nlabel = \"Mon\"\noffset = 9.0"
        )
        .is_err());
        assert!(Format::from_toml("[[days]]\nlabel = \"Mon\"\noffset = -1.0").is_err());
    }

    #[test]
    fn latin1_label_resolves() {
        let format = Format::default();
        assert_eq!(format.encoding().unwrap(), encoding_rs::WINDOWS_1252);
        let (text, _) = format
            .encoding()
            .unwrap()
            .decode_without_bom_handling(b"O\x92Brien");
        assert_eq!(text, "O\u{2019}Brien");
    }

    #[test]
    fn grid_fingerprint_needs_every_attribute() {
        let html = Html::parse_fragment(
            r#"<table cellspacing="0" border="1"></table>
               <table cellspacing="0"></table>
               <table cellspacing="0" border="2"></table>"#,
        );
        let sel = Selector::parse("table").unwrap();
        let format = Format::default();
        let matches: Vec<bool> = html
            .select(&sel)
            .map(|t| format.is_grid(t.value()))
            .collect();
        assert_eq!(matches, vec![true, false, false]);
    }
}
