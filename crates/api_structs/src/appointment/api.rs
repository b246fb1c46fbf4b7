use crate::dtos::{AppointmentDTO, AppointmentLinksDTO};
use plena_booking_domain::{CalendarEvent, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub appointment: AppointmentDTO,
}

impl AppointmentResponse {
    pub fn new(event: CalendarEvent) -> Self {
        Self {
            appointment: AppointmentDTO::new(event),
        }
    }
}

pub mod create_appointment_links {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// The client the capability links are issued to.
        pub email: String,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub links: AppointmentLinksDTO,
    }
}

pub mod get_appointment {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct QueryParams {
        pub token: String,
    }

    pub type APIResponse = AppointmentResponse;
}

pub mod cancel_appointment {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct RequestBody {
        pub token: String,
    }

    pub type APIResponse = AppointmentResponse;
}

pub mod edit_appointment {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub token: String,
        #[serde(default)]
        pub start_ts: Option<i64>,
        #[serde(default)]
        pub end_ts: Option<i64>,
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
    }

    pub type APIResponse = AppointmentResponse;
}
