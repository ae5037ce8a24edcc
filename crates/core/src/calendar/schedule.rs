use chrono::NaiveDateTime;

use crate::course::{NewCalendarEvent, ScheduleRow};

/// Title used when a schedule row has no topic.
pub const NO_TOPIC: &str = "No Topic";
/// Description used when a schedule row names no staff.
pub const NO_NOTES: &str = "No additional notes";
/// Location used when a schedule row names no room.
pub const NO_LOCATION: &str = "No specified location";

/// Context code that scopes calendar events to a course.
pub fn course_context_code(course_id: u64) -> String {
    format!("course_{course_id}")
}

/// Builds the event to create for a schedule row.
pub fn event_from_schedule_row(row: &ScheduleRow, context_code: &str) -> NewCalendarEvent {
    let title = non_blank(&row.topic).unwrap_or(NO_TOPIC).to_string();
    let description = non_blank(&row.staff)
        .map(|staff| format!("Supervised by {staff}"))
        .unwrap_or_else(|| NO_NOTES.to_string());
    let location_name = non_blank(&row.room).unwrap_or(NO_LOCATION).to_string();

    NewCalendarEvent {
        context_code: context_code.to_string(),
        title,
        description,
        start_at: row.start(),
        end_at: row.end(),
        location_name,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// "2024-03-04 at 10:00", used when reporting a conflict.
pub fn format_conflict_time(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d at %H:%M").to_string()
}

/// "on 03/04/2024 at 10:00", used when reporting a removal.
pub fn format_removal_time(at: NaiveDateTime) -> String {
    at.format("on %m/%d/%Y at %H:%M").to_string()
}

/// "10:00 on 2024-03-04", used when reporting a created event.
pub fn format_event_time(at: NaiveDateTime) -> String {
    at.format("%H:%M on %Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn row() -> ScheduleRow {
        ScheduleRow::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_event_uses_row_fields() {
        let event = event_from_schedule_row(
            &row().with_topic("Titration").with_staff("Dr Ng").with_room("Lab 2"),
            "course_7",
        );

        assert_eq!(event.title, "Titration");
        assert_eq!(event.description, "Supervised by Dr Ng");
        assert_eq!(event.location_name, "Lab 2");
        assert_eq!(event.context_code, "course_7");
        assert_eq!(event.start_at, row().start());
    }

    #[test]
    fn test_event_fallbacks() {
        let event = event_from_schedule_row(&row().with_topic("  "), "course_7");

        assert_eq!(event.title, NO_TOPIC);
        assert_eq!(event.description, NO_NOTES);
        assert_eq!(event.location_name, NO_LOCATION);
    }

    #[test]
    fn test_time_formats() {
        let at = row().start();
        assert_eq!(format_conflict_time(at), "2024-03-04 at 10:00");
        assert_eq!(format_removal_time(at), "on 03/04/2024 at 10:00");
        assert_eq!(format_event_time(at), "10:00 on 2024-03-04");
    }

    #[test]
    fn test_course_context_code() {
        assert_eq!(course_context_code(4411), "course_4411");
    }
}
