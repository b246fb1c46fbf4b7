use crate::appointment::mirror_status;
use crate::{
    error::PlenaError,
    shared::links::decode_hash_link,
    shared::usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use plena_booking_api_structs::confirm_request::*;
use plena_booking_domain::{
    derive_status, tag::REQUEST_PREFIX, AppointmentAction, AppointmentRecord, AppointmentStatus,
    CalendarEvent, CapabilityCodec, Transition,
};
use plena_booking_infra::{BookingNotification, PlenaContext};
use tracing::error;

fn handle_error(e: UseCaseErrors) -> PlenaError {
    match e {
        UseCaseErrors::InvalidLink => PlenaError::Unauthorized("Invalid link".to_string()),
        UseCaseErrors::NotFound => {
            PlenaError::NotFound("The appointment request was not found.".to_string())
        }
        UseCaseErrors::NotPending(status) => PlenaError::Conflict(format!(
            "The appointment request has already been resolved. Current status: {:?}",
            status
        )),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub async fn confirm_request_controller(
    query_params: web::Query<QueryParams>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = ConfirmRequestUseCase {
        data: query_params.data.clone(),
        key: query_params.key.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.event)))
        .map_err(handle_error)
}

/// Owner-side approval of a pending request via the mailed hash link.
/// Confirmation rewrites the event title without the request marker, which
/// is what flips the derived status to confirmed everywhere.
#[derive(Debug)]
pub struct ConfirmRequestUseCase {
    pub data: String,
    pub key: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub event: CalendarEvent,
    pub changed: bool,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidLink,
    NotFound,
    NotPending(AppointmentStatus),
    CalendarUnavailable,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ConfirmRequestUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &PlenaContext) -> Result<Self::Response, Self::Errors> {
        let codec = CapabilityCodec::new(&ctx.config.link_secret);
        let payload =
            decode_hash_link(&codec, &self.data, &self.key).ok_or(UseCaseErrors::InvalidLink)?;

        let mut event = ctx
            .calendar
            .get_event(&payload.event_id)
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?
            .ok_or(UseCaseErrors::NotFound)?;

        let status = derive_status(&event);
        match status.transition(AppointmentAction::Confirm) {
            Transition::Changed(AppointmentStatus::Confirmed) => {
                event.title = event
                    .title
                    .strip_prefix(REQUEST_PREFIX)
                    .unwrap_or(&event.title)
                    .to_string();
                let event = ctx.calendar.update_event(&event).await.map_err(|e| {
                    error!("Calendar provider error: {:?}", e);
                    UseCaseErrors::CalendarUnavailable
                })?;

                mirror_status(
                    ctx,
                    AppointmentRecord {
                        calendar_event_id: event.id.clone(),
                        status: AppointmentStatus::Confirmed,
                        confirmed_at: Some(ctx.sys.get_datetime()),
                        cancelled_at: None,
                    },
                )
                .await;

                Ok(UseCaseRes {
                    event,
                    changed: true,
                })
            }
            Transition::Unchanged => Ok(UseCaseRes {
                event,
                changed: false,
            }),
            _ => Err(UseCaseErrors::NotPending(status)),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyClientOnConfirmation)]
    }
}

pub struct NotifyClientOnConfirmation;

#[async_trait::async_trait(?Send)]
impl Subscriber<ConfirmRequestUseCase> for NotifyClientOnConfirmation {
    async fn notify(&self, res: &UseCaseRes, ctx: &PlenaContext) {
        if !res.changed {
            return;
        }
        ctx.notifier
            .notify(&BookingNotification::RequestConfirmed {
                event_id: res.event.id.to_string(),
                title: res.event.tag().clean_title,
            })
            .await;
    }
}
