use crate::interval::{InvalidIntervalError, TimeInterval};
use crate::shared::entity::{Entity, ID};
use crate::tag::EventTag;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Status tri-state reported by the external calendar provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Cancelled,
    Tentative,
}

/// An event as read from the external calendar. The calendar owns this data;
/// this system only parses it and, for lifecycle transitions, writes narrow
/// updates back through the provider API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: ID,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub timezone: Tz,
    pub status: EventStatus,
    #[serde(default)]
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn interval(&self) -> Result<TimeInterval, InvalidIntervalError> {
        TimeInterval::new(self.start_ts, self.end_ts)
    }

    pub fn tag(&self) -> EventTag {
        EventTag::parse(&self.title, &self.description)
    }
}

impl Entity<ID> for CalendarEvent {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
