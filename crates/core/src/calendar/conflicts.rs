use chrono::{NaiveDate, NaiveDateTime};

use crate::course::CalendarEvent;

/// Optional date bounds for listing events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl EventRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: Some(date),
            end: Some(date),
        }
    }

    /// Query parameters for the list-events endpoint (`YYYY-MM-DD`).
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)` share time.
///
/// Intervals that only touch (`a_end == b_start`) do not overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Existing events that overlap the candidate interval.
///
/// Event times are compared with their zone dropped. Events missing a start or
/// end cannot be placed and are ignored.
pub fn find_conflicts(
    existing: &[CalendarEvent],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<&CalendarEvent> {
    existing
        .iter()
        .filter(|event| match (event.naive_start(), event.naive_end()) {
            (Some(event_start), Some(event_end)) => overlaps(event_start, event_end, start, end),
            _ => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn event(id: u64, start: NaiveDateTime, end: NaiveDateTime) -> CalendarEvent {
        CalendarEvent {
            id,
            title: format!("Event {id}"),
            description: None,
            start_at: Some(Utc.from_utc_datetime(&start)),
            end_at: Some(Utc.from_utc_datetime(&end)),
            location_name: None,
            context_code: None,
        }
    }

    #[test]
    fn test_partial_overlap_is_detected() {
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 30), at(11, 30)));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        assert!(!overlaps(at(10, 0), at(11, 0), at(11, 0), at(12, 0)));
        assert!(!overlaps(at(11, 0), at(12, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(overlaps(at(9, 0), at(17, 0), at(10, 0), at(11, 0)));
        assert!(overlaps(at(10, 0), at(11, 0), at(9, 0), at(17, 0)));
    }

    #[test]
    fn test_find_conflicts() {
        let existing = vec![
            event(1, at(10, 0), at(11, 0)),
            event(2, at(13, 0), at(14, 0)),
            CalendarEvent {
                start_at: None,
                ..event(3, at(10, 0), at(11, 0))
            },
        ];

        let conflicts = find_conflicts(&existing, at(10, 30), at(11, 30));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, 1);

        assert!(find_conflicts(&existing, at(11, 0), at(12, 0)).is_empty());
    }

    #[test]
    fn test_event_range_query_pairs() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(
            EventRange::day(date).query_pairs(),
            vec![
                ("start_date", "2024-03-04".to_string()),
                ("end_date", "2024-03-04".to_string())
            ]
        );
        assert!(EventRange::default().query_pairs().is_empty());
    }
}
