use chrono::{NaiveTime, TimeDelta};
use scraper::{ElementRef, Html};

use crate::error::Result;
use crate::format::Format;
use crate::info::HeaderParser;
use crate::utils::{children_named, colspan, flat_text, nth_cell, SEL_TABLE};

pub mod models;

use models::{Activity, Metadata, COLUMN_HOURS};

/// Extract every activity of every grid in the document, in discovery order
pub fn timetable(document: &Html, format: &Format) -> Result<Vec<Activity>> {
    let headers = HeaderParser::new(&format.markers)?;

    // Document order, so a grid's preceding tables are the ones before it
    let tables: Vec<ElementRef> = document.select(&SEL_TABLE).collect();

    let mut activities = vec![];
    let mut grids = 0;
    for (i, grid) in tables.iter().enumerate() {
        if !format.is_grid(grid.value()) {
            continue;
        }
        grids += 1;

        let meta = headers.info(&tables[..i]);
        tracing::debug!(class = %meta.class_groups, dept = %meta.dept, "grid found");

        for row in rows(*grid) {
            activities.extend(decode_row(row, &meta, format));
        }
    }

    tracing::info!(grids, activities = activities.len(), "timetable extracted");
    Ok(activities)
}

/// Rows belonging to the grid itself, not to tables nested in its cells.
///
/// The HTML parser wraps bare rows in an implied `tbody`, so row groups
/// directly under the grid are looked through.
fn rows(grid: ElementRef) -> Vec<ElementRef> {
    let mut rows = vec![];
    for child in grid.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(children_named(child, "tr")),
            _ => (),
        }
    }
    rows
}

/// Turn one day row into its activities
fn decode_row(row: ElementRef, meta: &Metadata, format: &Format) -> Vec<Activity> {
    let mut cells = children_named(row, "td");

    // Rows without a day label are headers or spacers
    let Some(label) = cells.next().map(|cell| flat_text(cell, "")) else {
        return vec![];
    };
    let Some(day_offset) = format.day_offset(&label) else {
        tracing::trace!(label = %label, "skipping row");
        return vec![];
    };

    let mut activities = vec![];
    // Hours covered by the cells already walked in this row
    let mut column = 0.0;
    for cell in cells {
        let duration = f64::from(colspan(cell)) * COLUMN_HOURS;

        if let Some(activity) = decode_cell(cell, meta) {
            activities.push(Activity {
                day: label.clone(),
                timeslot: day_offset + column,
                duration,
                ..activity
            });
        }

        // Empty cells still take up time
        column += duration;
    }

    if column > format.day_span {
        tracing::warn!(
            day = %label,
            width = column,
            day_span = format.day_span,
            "row is wider than a day, its last activities overlap the next day"
        );
    }

    activities
}

/// Fields of the activity held by a cell, `None` if it has no nested table.
///
/// Position and duration are left for the caller.
fn decode_cell(cell: ElementRef, meta: &Metadata) -> Option<Activity> {
    // Module and type, then lecturer, then room and weeks
    let nested: Vec<ElementRef> = cell.select(&SEL_TABLE).take(3).collect();
    let first = *nested.first()?;
    let second = nested.get(1).copied();
    let third = nested.get(2).copied();

    Some(Activity {
        idx: 0,
        day: String::new(),
        timeslot: 0.0,
        lecturer: second.map(|t| flat_text(t, "")).unwrap_or_default(),
        module: nth_cell(first, 0),
        dept: meta.dept.clone(),
        class_groups: meta.class_groups.clone(),
        act_type: nth_cell(first, 1),
        weeks: third.map(|t| nth_cell(t, 1)).unwrap_or_default(),
        duration: 0.0,
        room: third.map(|t| nth_cell(t, 0)).unwrap_or_default(),
    })
}

/// Display the timetable, grouped by day
pub fn display(activities: &[Activity], format: &Format) -> Result<()> {
    for line in preview(activities, format)? {
        println!("{line}");
    }

    Ok(())
}

/// Lines of the preview: a day label, then one line per activity of that day.
///
/// Activities stay under the day row they were read from, even when the row
/// runs past `day_span`.
fn preview(activities: &[Activity], format: &Format) -> Result<Vec<String>> {
    let day_start = format.day_start()?;

    let mut lines = vec![];
    for day in &format.days {
        let mut today = activities
            .iter()
            .filter(|a| a.day == day.label)
            .peekable();
        if today.peek().is_none() {
            continue;
        }

        lines.push(day.label.clone());
        for activity in today {
            let start = clock(day_start, activity.timeslot - day.offset);
            let finish = clock(day_start, activity.timeslot - day.offset + activity.duration);
            lines.push(format!(
                "  {}-{}  {:<12} {:<10} {:<10} {:<16} {}",
                start.format("%H:%M"),
                finish.format("%H:%M"),
                activity.module,
                activity.act_type,
                activity.room,
                activity.class_groups,
                activity.lecturer,
            ));
        }
    }

    Ok(lines)
}

/// Wall-clock time `hours` after `start`
#[allow(clippy::cast_possible_truncation)]
fn clock(start: NaiveTime, hours: f64) -> NaiveTime {
    start + TimeDelta::minutes((hours * 60.0).round() as i64)
}
