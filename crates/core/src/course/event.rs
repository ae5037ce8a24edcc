use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::assignment::NAIVE_TIMESTAMP_FORMAT;

/// A calendar event on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub context_code: Option<String>,
}

impl CalendarEvent {
    /// Start time with the zone dropped, comparable with schedule times.
    pub fn naive_start(&self) -> Option<NaiveDateTime> {
        self.start_at.map(|t| t.naive_utc())
    }

    /// End time with the zone dropped, comparable with schedule times.
    pub fn naive_end(&self) -> Option<NaiveDateTime> {
        self.end_at.map(|t| t.naive_utc())
    }
}

/// Request body for creating a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCalendarEvent {
    pub context_code: String,
    pub title: String,
    pub description: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub location_name: String,
}

impl NewCalendarEvent {
    /// JSON payload for the create-event endpoint.
    pub fn to_payload(&self) -> Value {
        json!({
            "calendar_event": {
                "context_code": self.context_code,
                "title": self.title,
                "description": self.description,
                "start_at": self.start_at.format(NAIVE_TIMESTAMP_FORMAT).to_string(),
                "end_at": self.end_at.format(NAIVE_TIMESTAMP_FORMAT).to_string(),
                "location_name": self.location_name,
            }
        })
    }
}

/// Outcome of creating a calendar event.
///
/// Event creation never fails with an error: a rejected request carries the
/// response body (or a synthesized error object when no response arrived) so the
/// caller can inspect it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventCreation {
    Created(CalendarEvent),
    Rejected {
        status: Option<u16>,
        payload: Value,
    },
}
