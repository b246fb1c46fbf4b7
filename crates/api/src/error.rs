use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use plena_booking_domain::CapabilityError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlenaError {
    #[error("Internal server error")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("There was a conflict with the request. Error message: `{0}`")]
    Conflict(String),
    #[error("Unauthorized request. Error message: `{0}`")]
    Unauthorized(String),
    #[error("410 Gone. Error message: `{0}`")]
    Gone(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
}

impl From<CapabilityError> for PlenaError {
    fn from(e: CapabilityError) -> Self {
        match e {
            CapabilityError::Expired => Self::Gone(e.to_string()),
            CapabilityError::Invalid | CapabilityError::EventMismatch => {
                Self::Unauthorized(e.to_string())
            }
        }
    }
}

impl actix_web::error::ResponseError for PlenaError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Gone(_) => StatusCode::GONE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .body(self.to_string())
    }
}
