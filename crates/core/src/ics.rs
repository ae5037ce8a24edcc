//! iCalendar (RFC 5545) export of a schedule.
//!
//! Events use floating local times: schedule sheets carry no zone, so the file
//! shows each session at the same wall-clock time wherever it is opened.

use chrono::{DateTime, NaiveDateTime, Utc};
use icalendar::{Calendar, Component, Event, EventLike};
use serde::Serialize;
use uuid::Uuid;

use crate::course::ScheduleRow;

/// Extension of exported calendar files.
pub const ICS_EXTENSION: &str = "ics";
/// Name used when a schedule row has no topic.
pub const UNNAMED_EVENT: &str = "Unnamed Event";
/// Location used when a schedule row names no room.
pub const NO_LOCATION: &str = "No Location";
/// Category attached to every exported event.
pub const SCHEDULE_CATEGORY: &str = "Course Schedule";

/// An event ready to be written to a calendar file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortableEvent {
    pub uid: Uuid,
    pub name: String,
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: String,
    pub categories: Vec<String>,
}

impl PortableEvent {
    pub fn from_schedule_row(row: &ScheduleRow) -> Self {
        let name = row
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNNAMED_EVENT);
        let location = row
            .room
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_LOCATION);
        Self {
            uid: Uuid::new_v4(),
            name: name.to_string(),
            begin: row.start(),
            end: row.end(),
            location: location.to_string(),
            categories: vec![SCHEDULE_CATEGORY.to_string()],
        }
    }
}

/// Converts every schedule row into a portable event.
pub fn portable_events(rows: &[ScheduleRow]) -> Vec<PortableEvent> {
    rows.iter().map(PortableEvent::from_schedule_row).collect()
}

/// File name for an export: `<base>.ics`, unless the base already ends with it.
pub fn calendar_file_name(base_name: &str) -> String {
    let suffix = format!(".{ICS_EXTENSION}");
    if base_name.to_ascii_lowercase().ends_with(&suffix) {
        base_name.to_string()
    } else {
        format!("{base_name}{suffix}")
    }
}

/// Serializes events as an iCalendar document.
pub fn write_calendar(events: &[PortableEvent], stamp: DateTime<Utc>) -> String {
    let mut calendar = Calendar::new();
    for event in events {
        let mut entry = Event::new();
        entry
            .uid(&event.uid.to_string())
            .timestamp(stamp)
            .summary(&event.name)
            .location(&event.location)
            .starts(event.begin)
            .ends(event.end);
        if !event.categories.is_empty() {
            entry.add_property("CATEGORIES", &event.categories.join(","));
        }
        calendar.push(entry.done());
    }
    calendar.to_string()
}
