//! Calendar synchronization logic: schedule rows to events, conflict detection
//! and the display formats used in reports.

mod conflicts;
mod schedule;

pub use conflicts::{find_conflicts, overlaps, EventRange};
pub use schedule::{
    course_context_code, event_from_schedule_row, format_conflict_time, format_event_time,
    format_removal_time, NO_LOCATION, NO_NOTES, NO_TOPIC,
};
