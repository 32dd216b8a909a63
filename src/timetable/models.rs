use serde::Serialize;

/// Length of one grid column, in hours
pub const COLUMN_HOURS: f64 = 0.25;

/// One scheduled entry of the timetable
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Activity {
    /// Position in the sorted output, filled by `order::index`
    pub idx: usize,

    /// Label of the row the activity was read from, not exported
    #[serde(skip)]
    pub day: String,

    /// Hours since the start of the week:
    /// - the day's offset
    /// - plus the width of every cell before this one in the row
    pub timeslot: f64,

    pub lecturer: String,
    pub module: String,
    pub dept: String,
    pub class_groups: String,

    /// Lecture, lab, tutorial...
    pub act_type: String,

    /// Teaching weeks the activity runs on, as printed
    pub weeks: String,

    /// Length in hours, a multiple of a quarter hour
    pub duration: f64,

    pub room: String,
}

/// Class and department a grid belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub class_groups: String,
    pub dept: String,
}
