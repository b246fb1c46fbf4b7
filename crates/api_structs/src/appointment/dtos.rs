use plena_booking_domain::tag::parse_booking_details;
use plena_booking_domain::{derive_status, AppointmentStatus, CalendarEvent, ID};
use serde::{Deserialize, Serialize};

/// Client-facing view of one appointment, assembled from the calendar
/// event. Titles are returned clean of the internal request marker.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDTO {
    pub id: ID,
    pub title: String,
    pub status: AppointmentStatus,
    pub start_ts: i64,
    pub end_ts: i64,
    pub timezone: String,
    pub location: Option<String>,
    pub service: Option<String>,
    pub client_name: Option<String>,
    pub duration_minutes: Option<i64>,
}

impl AppointmentDTO {
    pub fn new(event: CalendarEvent) -> Self {
        let status = derive_status(&event);
        let tag = event.tag();
        let details = parse_booking_details(&tag.clean_title);
        Self {
            id: event.id.clone(),
            title: tag.clean_title,
            status,
            start_ts: event.start_ts,
            end_ts: event.end_ts,
            timezone: event.timezone.to_string(),
            location: event.location,
            service: details.service,
            client_name: details.client_name,
            duration_minutes: details.duration_minutes,
        }
    }
}

/// The full set of links handed to a client after booking.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentLinksDTO {
    /// Capability token embedded in the view, cancel and edit links.
    pub token: String,
    pub view_url: String,
    pub cancel_url: String,
    pub edit_url: String,
    /// Hash links for the business owner's approval mail.
    pub confirm_url: String,
    pub decline_url: String,
    pub expires_at: i64,
}
