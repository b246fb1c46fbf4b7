use crate::AppointmentResponse;
use serde::{Deserialize, Serialize};

/// Hash-link approval endpoints. `data` is the URL-encoded payload, `key`
/// its MAC; both come straight out of the mailed link.
#[derive(Debug, Deserialize, Serialize)]
pub struct HashLinkQueryParams {
    pub data: String,
    pub key: String,
}

pub mod confirm_request {
    use super::*;

    pub type QueryParams = HashLinkQueryParams;
    pub type APIResponse = AppointmentResponse;
}

pub mod decline_request {
    use super::*;

    pub type QueryParams = HashLinkQueryParams;
    pub type APIResponse = AppointmentResponse;
}
