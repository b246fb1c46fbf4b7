use crate::event::{CalendarEvent, EventStatus};
use crate::shared::entity::ID;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an appointment as presented to clients. Derived from the
/// authoritative calendar event; the mirrored cache row stores a copy for
/// cheap reads only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Decline,
    Cancel,
    Edit,
    /// Operator-driven, out of band.
    Complete,
}

/// Outcome of applying an action to a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Changed(AppointmentStatus),
    /// The action is a no-op because the appointment is already in the
    /// target state. Idempotent success: no calendar write.
    Unchanged,
    Invalid,
}

impl AppointmentStatus {
    pub fn transition(self, action: AppointmentAction) -> Transition {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        match (self, action) {
            (Pending, Confirm) => Transition::Changed(Confirmed),
            (Pending, Decline) => Transition::Changed(Cancelled),
            (Confirmed, Cancel) => Transition::Changed(Cancelled),
            // Field edits only; the status does not move.
            (Confirmed, Edit) => Transition::Unchanged,
            (_, Complete) => Transition::Changed(Completed),
            // Double-clicks and duplicate delivery retries.
            (Cancelled, Cancel) | (Cancelled, Decline) => Transition::Unchanged,
            (Confirmed, Confirm) => Transition::Unchanged,
            _ => Transition::Invalid,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

/// Maps a calendar event to the client-facing status. The calendar status
/// takes precedence over the pending marker: a cancelled event stays
/// cancelled even when its title still carries the request prefix.
pub fn derive_status(event: &CalendarEvent) -> AppointmentStatus {
    if event.status == EventStatus::Cancelled {
        return AppointmentStatus::Cancelled;
    }
    if event.tag().is_request {
        AppointmentStatus::Pending
    } else {
        AppointmentStatus::Confirmed
    }
}

/// Allow-listed fields a capability-link edit may change. Everything else
/// on the event is off limits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, event: &mut CalendarEvent) {
        if let Some(start_ts) = self.start_ts {
            event.start_ts = start_ts;
        }
        if let Some(end_ts) = self.end_ts {
            event.end_ts = end_ts;
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
    }
}

/// Row shape of the mirrored status cache. Best effort: may lag behind or
/// be absent; the calendar stays authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub calendar_event_id: ID,
    pub status: AppointmentStatus,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        assert_eq!(Pending.transition(Confirm), Transition::Changed(Confirmed));
        assert_eq!(Pending.transition(Decline), Transition::Changed(Cancelled));
        assert_eq!(Confirmed.transition(Cancel), Transition::Changed(Cancelled));
        assert_eq!(Confirmed.transition(Edit), Transition::Unchanged);
        assert_eq!(Pending.transition(Complete), Transition::Changed(Completed));
        assert_eq!(
            Confirmed.transition(Complete),
            Transition::Changed(Completed)
        );
    }

    #[test]
    fn cancel_and_decline_are_idempotent() {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        assert_eq!(Cancelled.transition(Cancel), Transition::Unchanged);
        assert_eq!(Cancelled.transition(Decline), Transition::Unchanged);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        assert_eq!(Pending.transition(Cancel), Transition::Invalid);
        assert_eq!(Pending.transition(Edit), Transition::Invalid);
        assert_eq!(Cancelled.transition(Confirm), Transition::Invalid);
        assert_eq!(Cancelled.transition(Edit), Transition::Invalid);
        assert_eq!(Completed.transition(Cancel), Transition::Invalid);
    }

    fn event(title: &str, status: EventStatus) -> CalendarEvent {
        CalendarEvent {
            id: Default::default(),
            title: title.to_string(),
            description: String::new(),
            start_ts: 0,
            end_ts: 1000,
            timezone: chrono_tz::UTC,
            status,
            location: None,
        }
    }

    #[test]
    fn request_marker_with_confirmed_calendar_status_is_pending() {
        let e = event(
            "REQUEST: 60 minute massage with Jane Smith - TrilliumMassage",
            EventStatus::Confirmed,
        );
        assert_eq!(derive_status(&e), AppointmentStatus::Pending);

        let details = crate::tag::parse_booking_details(&e.tag().clean_title);
        assert_eq!(details.duration_minutes, Some(60));
        assert_eq!(details.client_name.as_deref(), Some("Jane Smith"));
    }

    #[test]
    fn calendar_cancellation_overrides_the_pending_marker() {
        let e = event(
            "REQUEST: 60 minute massage with Jane Smith - TrilliumMassage",
            EventStatus::Cancelled,
        );
        assert_eq!(derive_status(&e), AppointmentStatus::Cancelled);
    }

    #[test]
    fn plain_title_is_confirmed() {
        let e = event("60 minute massage with Jane Smith", EventStatus::Confirmed);
        assert_eq!(derive_status(&e), AppointmentStatus::Confirmed);
    }

    #[test]
    fn patch_only_touches_allow_listed_fields() {
        let mut e = event("60 minute massage", EventStatus::Confirmed);
        let patch = EventPatch {
            start_ts: Some(5000),
            end_ts: Some(9000),
            location: Some("Studio B".into()),
            description: None,
        };
        patch.apply_to(&mut e);
        assert_eq!(e.start_ts, 5000);
        assert_eq!(e.end_ts, 9000);
        assert_eq!(e.location.as_deref(), Some("Studio B"));
        assert_eq!(e.title, "60 minute massage");
        assert!(e.description.is_empty());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(EventPatch::default().is_empty());
        assert!(!EventPatch {
            location: Some("x".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
