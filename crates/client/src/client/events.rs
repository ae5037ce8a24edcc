//! Calendar event API operations.

use async_trait::async_trait;
use coursesync_core::calendar::{course_context_code, EventRange};
use coursesync_core::course::{CalendarEvent, EventCreation, NewCalendarEvent};
use coursesync_core::platform::{CalendarApi, Result};
use serde_json::{json, Value};

use super::{transport, CanvasClient};

#[async_trait]
impl CalendarApi for CanvasClient {
    async fn list_events(&self, range: EventRange) -> Result<Vec<CalendarEvent>> {
        let mut query = vec![("context_codes[]", self.context_code())];
        let bounds = range.query_pairs();
        if bounds.is_empty() {
            query.push(("all_events", "true".to_string()));
        }
        query.extend(bounds);
        self.get_paged("calendar events", &self.url("/calendar_events"), &query)
            .await
    }

    async fn get_event(&self, event_id: u64) -> Result<CalendarEvent> {
        self.get_one(
            &format!("calendar event {event_id}"),
            &self.url(&format!("/calendar_events/{event_id}")),
        )
        .await
    }

    async fn create_event(&self, event: &NewCalendarEvent) -> EventCreation {
        let response = match self
            .post(&self.url("/calendar_events"))
            .json(&event.to_payload())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return EventCreation::Rejected {
                    status: None,
                    payload: json!({ "error": e.to_string() }),
                }
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let payload: Value =
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "error": text }));

        if !status.is_success() {
            return EventCreation::Rejected {
                status: Some(status.as_u16()),
                payload,
            };
        }
        match serde_json::from_value::<CalendarEvent>(payload.clone()) {
            Ok(created) => EventCreation::Created(created),
            Err(_) => EventCreation::Rejected {
                status: Some(status.as_u16()),
                payload,
            },
        }
    }

    async fn delete_event(&self, event_id: u64) -> Result<()> {
        let response = self
            .delete(&self.url(&format!("/calendar_events/{event_id}")))
            .send()
            .await
            .map_err(transport)?;
        self.handle_delete_response(&format!("delete calendar event {event_id}"), response)
            .await
    }

    fn context_code(&self) -> String {
        course_context_code(self.course_id())
    }
}
