//! Semicolon separated export of the activities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::timetable::models::Activity;

/// Column names, in output order
pub const HEADER: [&str; 10] = [
    "Idx",
    "Timeslot",
    "Lecturer",
    "Module",
    "Dept",
    "ClassGroups",
    "ActType",
    "Weeks",
    "Duration",
    "Room",
];

/// Serialize the header and every activity.
///
/// Fields holding `;`, `"` or a line break are quoted, lines end with CRLF.
pub fn to_bytes(activities: &[Activity]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::CRLF)
        .from_writer(&mut buf);

    writer.write_record(HEADER)?;
    for activity in activities {
        writer.serialize(activity)?;
    }

    // Check for error rather than implicitly flushing and ignoring.
    writer.flush().map_err(csv::Error::from)?;
    drop(writer);

    Ok(buf)
}

/// Write the file in one go.
///
/// The content goes to a sibling `.part` file first and is renamed over
/// `path`, so a failure never leaves a truncated export behind.
pub fn export(activities: &[Activity], path: &Path) -> Result<()> {
    let contents = to_bytes(activities)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    let part = part_path(path);
    if let Err(e) = fs::write(&part, contents) {
        let _ = fs::remove_file(&part);
        return Err(Error::io(&part, e));
    }
    if let Err(e) = fs::rename(&part, path) {
        let _ = fs::remove_file(&part);
        return Err(Error::io(path, e));
    }

    tracing::debug!(path = %path.display(), "export written");
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
