use crate::{
    error::PlenaError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use plena_booking_api_structs::get_appointment::*;
use plena_booking_domain::{CalendarEvent, CapabilityCodec, CapabilityError, ID};
use plena_booking_infra::PlenaContext;
use tracing::{error, warn};

fn handle_error(e: UseCaseErrors) -> PlenaError {
    match e {
        UseCaseErrors::Token(e) => e.into(),
        UseCaseErrors::NotFound(event_id) => PlenaError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_id
        )),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub async fn get_appointment_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = GetAppointmentUseCase {
        event_id: path_params.event_id.clone(),
        token: query_params.token.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(handle_error)
}

/// Read side of a capability link: the token authenticates the request
/// entirely on its own, no session or account required.
#[derive(Debug)]
pub struct GetAppointmentUseCase {
    pub event_id: ID,
    pub token: String,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    Token(CapabilityError),
    NotFound(ID),
    CalendarUnavailable,
}

/// The token check runs before anything touches the calendar, so probing
/// for event existence without a valid token is impossible.
pub(crate) fn verify_token(
    ctx: &PlenaContext,
    token: &str,
    event_id: &ID,
) -> Result<(), CapabilityError> {
    let codec = CapabilityCodec::new(&ctx.config.link_secret);
    codec
        .verify(token, event_id, ctx.sys.get_datetime())
        .map(|_| ())
        .inspect_err(|e| {
            if *e == CapabilityError::EventMismatch {
                warn!("Capability token presented for the wrong event: {}", event_id);
            }
        })
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAppointmentUseCase {
    type Response = CalendarEvent;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &PlenaContext) -> Result<Self::Response, Self::Errors> {
        verify_token(ctx, &self.token, &self.event_id).map_err(UseCaseErrors::Token)?;

        ctx.calendar
            .get_event(&self.event_id)
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))
    }
}
