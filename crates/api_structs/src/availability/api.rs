use crate::dtos::AvailabilityDTO;
use plena_booking_domain::{Availability, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub availability: AvailabilityDTO,
}

impl AvailabilityResponse {
    pub fn new(availability: Availability) -> Self {
        Self {
            availability: AvailabilityDTO::new(availability),
        }
    }
}

pub mod get_availability {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub namespace: String,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub start_date: String,
        pub end_date: String,
        #[serde(default)]
        pub timezone: Option<String>,
        /// Comma separated durations in minutes. Defaults to the
        /// namespace's allowed durations.
        #[serde(default)]
        pub durations: Option<String>,
    }

    pub type APIResponse = AvailabilityResponse;
}

pub mod get_adjacent_availability {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub namespace: String,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        /// Anchor appointment the returned slots follow directly.
        pub event_id: ID,
        #[serde(default)]
        pub durations: Option<String>,
    }

    pub type APIResponse = AvailabilityResponse;
}
