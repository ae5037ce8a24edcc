//! Calendar synchronization: schedule upload, bulk removal and file export.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use coursesync_core::calendar::{
    event_from_schedule_row, find_conflicts, format_conflict_time, format_event_time,
    format_removal_time, EventRange,
};
use coursesync_core::course::{CalendarEvent, EventCreation, NewCalendarEvent, ScheduleRow};
use coursesync_core::ics::{calendar_file_name, portable_events, write_calendar};
use coursesync_core::platform::CalendarApi;

use crate::error::Result;

/// Outcome of uploading one schedule row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Created {
        event_id: u64,
        title: String,
        at: String,
    },
    /// An existing event overlaps; nothing was created.
    Conflict {
        title: String,
        at: String,
        conflicting: Vec<String>,
    },
    Rejected {
        title: String,
        status: Option<u16>,
        payload: Value,
    },
}

/// Outcome of removing one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemovalOutcome {
    Deleted {
        event_id: u64,
        title: String,
        at: String,
    },
    Failed {
        event_id: u64,
        title: String,
        at: String,
        error: String,
    },
}

/// Pushes schedules to the course calendar and clears it.
pub struct CalendarSynchronizer<'a, P: ?Sized> {
    platform: &'a P,
}

impl<'a, P: CalendarApi + ?Sized> CalendarSynchronizer<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    pub async fn fetch_events(&self, range: EventRange) -> Result<Vec<CalendarEvent>> {
        let events = self.platform.list_events(range).await?;
        tracing::debug!(count = events.len(), "Fetched calendar events");
        Ok(events)
    }

    pub async fn fetch_event(&self, event_id: u64) -> Result<CalendarEvent> {
        Ok(self.platform.get_event(event_id).await?)
    }

    /// Creates an event. Rejections come back as a value, never as an error.
    pub async fn create_event(&self, event: &NewCalendarEvent) -> EventCreation {
        let creation = self.platform.create_event(event).await;
        match &creation {
            EventCreation::Created(created) => {
                tracing::info!(
                    title = %created.title,
                    at = %format_event_time(event.start_at),
                    "Created event"
                );
            }
            EventCreation::Rejected { status, payload } => {
                tracing::error!(title = %event.title, ?status, %payload, "Event rejected");
            }
        }
        creation
    }

    /// Creates one event per schedule row unless it would overlap an event
    /// already on the calendar that day.
    ///
    /// Failing to list a day's events aborts the upload.
    pub async fn upload_schedule(&self, rows: &[ScheduleRow]) -> Result<Vec<UploadOutcome>> {
        let context_code = self.platform.context_code();
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in rows {
            let event = event_from_schedule_row(row, &context_code);
            let existing = self.fetch_events(EventRange::day(row.date)).await?;
            let conflicts = find_conflicts(&existing, event.start_at, event.end_at);

            if !conflicts.is_empty() {
                let at = format_conflict_time(event.start_at);
                tracing::warn!(title = %event.title, %at, "Conflicts with an existing event, skipped");
                outcomes.push(UploadOutcome::Conflict {
                    title: event.title,
                    at,
                    conflicting: conflicts.iter().map(|c| c.title.clone()).collect(),
                });
                continue;
            }

            let outcome = match self.create_event(&event).await {
                EventCreation::Created(created) => UploadOutcome::Created {
                    event_id: created.id,
                    title: event.title,
                    at: format_event_time(event.start_at),
                },
                EventCreation::Rejected { status, payload } => UploadOutcome::Rejected {
                    title: event.title,
                    status,
                    payload,
                },
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Deletes every event in range, reporting each one.
    pub async fn remove_events(&self, range: EventRange) -> Result<Vec<RemovalOutcome>> {
        let events = self.fetch_events(range).await?;
        let mut outcomes = Vec::with_capacity(events.len());

        for event in events {
            let at = event
                .naive_start()
                .map(format_removal_time)
                .unwrap_or_else(|| "at an unknown time".to_string());
            let outcome = match self.platform.delete_event(event.id).await {
                Ok(()) => {
                    tracing::info!(title = %event.title, %at, "Deleted event");
                    RemovalOutcome::Deleted {
                        event_id: event.id,
                        title: event.title,
                        at,
                    }
                }
                Err(e) => {
                    tracing::error!(title = %event.title, %at, error = %e, "Failed to delete event");
                    RemovalOutcome::Failed {
                        event_id: event.id,
                        title: event.title,
                        at,
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Writes the schedule as an iCalendar file `<dir>/<base_name>.ics` and returns
/// its path. No platform call is made.
pub fn export_to_portable_calendar(
    rows: &[ScheduleRow],
    dir: &Path,
    base_name: &str,
) -> Result<PathBuf> {
    let events = portable_events(rows);
    let path = dir.join(calendar_file_name(base_name));
    std::fs::write(&path, write_calendar(&events, Utc::now()))?;
    tracing::info!(path = %path.display(), events = events.len(), "Exported calendar");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::{FailurePoint, InMemoryPlatform};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_time(time(h, m))
    }

    fn row(start: NaiveTime, end: NaiveTime) -> ScheduleRow {
        ScheduleRow::new(day(), start, end)
    }

    #[tokio::test]
    async fn test_overlapping_row_is_skipped() {
        let platform = InMemoryPlatform::new(7);
        platform.seed_event("Lecture", at(10, 0), at(11, 0)).await;
        let sync = CalendarSynchronizer::new(&platform);

        let outcomes = sync
            .upload_schedule(&[row(time(10, 30), time(11, 30)).with_topic("Lab")])
            .await
            .unwrap();

        assert_eq!(
            outcomes,
            vec![UploadOutcome::Conflict {
                title: "Lab".to_string(),
                at: "2024-03-04 at 10:30".to_string(),
                conflicting: vec!["Lecture".to_string()],
            }]
        );
        assert!(platform.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_touching_row_is_created() {
        let platform = InMemoryPlatform::new(7);
        platform.seed_event("Lecture", at(10, 0), at(11, 0)).await;
        let sync = CalendarSynchronizer::new(&platform);

        let outcomes = sync
            .upload_schedule(&[row(time(11, 0), time(12, 0))])
            .await
            .unwrap();

        assert!(matches!(&outcomes[0], UploadOutcome::Created { title, .. } if title == "No Topic"));
        let created = platform
            .events()
            .await
            .into_iter()
            .find(|e| e.title == "No Topic")
            .unwrap();
        assert_eq!(created.description.as_deref(), Some("No additional notes"));
        assert_eq!(created.location_name.as_deref(), Some("No specified location"));
        assert_eq!(created.context_code.as_deref(), Some("course_7"));
    }

    #[tokio::test]
    async fn test_rows_in_one_upload_conflict_with_each_other() {
        let platform = InMemoryPlatform::new(7);
        let sync = CalendarSynchronizer::new(&platform);

        let outcomes = sync
            .upload_schedule(&[
                row(time(9, 0), time(10, 0)).with_staff("Dr Ng"),
                row(time(9, 30), time(10, 30)),
            ])
            .await
            .unwrap();

        assert!(matches!(outcomes[0], UploadOutcome::Created { .. }));
        assert!(matches!(outcomes[1], UploadOutcome::Conflict { .. }));
        assert_eq!(
            platform.events().await[0].description.as_deref(),
            Some("Supervised by Dr Ng")
        );
    }

    #[tokio::test]
    async fn test_rejected_creation_is_reported() {
        let platform = InMemoryPlatform::new(7);
        platform.fail_on(FailurePoint::CreateEvent("Lab".to_string())).await;
        let sync = CalendarSynchronizer::new(&platform);

        let outcomes = sync
            .upload_schedule(&[row(time(9, 0), time(10, 0)).with_topic("Lab")])
            .await
            .unwrap();

        assert!(matches!(outcomes[0], UploadOutcome::Rejected { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_upload_aborts_when_listing_fails() {
        let platform = InMemoryPlatform::new(7);
        platform.fail_on(FailurePoint::ListEvents).await;
        let sync = CalendarSynchronizer::new(&platform);

        assert!(sync
            .upload_schedule(&[row(time(9, 0), time(10, 0))])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_remove_events_reports_each() {
        let platform = InMemoryPlatform::new(7);
        platform.seed_event("Lecture", at(10, 0), at(11, 0)).await;
        let stuck = platform.seed_event("Lab", at(14, 0), at(15, 0)).await;
        platform.fail_on(FailurePoint::DeleteEvent(stuck)).await;
        let sync = CalendarSynchronizer::new(&platform);

        let outcomes = sync.remove_events(EventRange::default()).await.unwrap();

        assert!(matches!(
            &outcomes[0],
            RemovalOutcome::Deleted { title, at, .. } if title == "Lecture" && at == "on 03/04/2024 at 10:00"
        ));
        assert!(matches!(outcomes[1], RemovalOutcome::Failed { event_id, .. } if event_id == stuck));
        assert_eq!(platform.events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_event() {
        let platform = InMemoryPlatform::new(7);
        let id = platform.seed_event("Lecture", at(10, 0), at(11, 0)).await;
        let sync = CalendarSynchronizer::new(&platform);

        assert_eq!(sync.fetch_event(id).await.unwrap().title, "Lecture");
        assert!(sync.fetch_event(id + 1).await.is_err());
    }

    #[test]
    fn test_export_writes_ics_file() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            row(time(9, 0), time(10, 0)).with_topic("Titration").with_room("Lab 2"),
            row(time(11, 0), time(12, 0)),
        ];

        let path = export_to_portable_calendar(&rows, dir.path(), "labs").unwrap();

        assert_eq!(path, dir.path().join("labs.ics"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("BEGIN:VEVENT").count(), 2);
        assert!(contents.contains("SUMMARY:Titration\r\n"));
        assert!(contents.contains("SUMMARY:Unnamed Event\r\n"));
        assert!(contents.contains("LOCATION:No Location\r\n"));
    }
}
