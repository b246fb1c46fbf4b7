use super::mirror_status;
use crate::appointment::get_appointment::verify_token;
use crate::{
    error::PlenaError,
    shared::usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use plena_booking_api_structs::cancel_appointment::*;
use plena_booking_domain::{
    derive_status, AppointmentAction, AppointmentRecord, AppointmentStatus, CalendarEvent,
    CapabilityError, EventStatus, Transition, ID,
};
use plena_booking_infra::{BookingNotification, PlenaContext};
use tracing::error;

fn handle_error(e: UseCaseErrors) -> PlenaError {
    match e {
        UseCaseErrors::Token(e) => e.into(),
        UseCaseErrors::NotFound(event_id) => PlenaError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_id
        )),
        UseCaseErrors::NotCancellable(status) => PlenaError::Conflict(format!(
            "The appointment can no longer be cancelled. Current status: {:?}",
            status
        )),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub async fn cancel_appointment_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = CancelAppointmentUseCase {
        event_id: path_params.event_id.clone(),
        token: body.token.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.event)))
        .map_err(handle_error)
}

/// Cancels through a capability link. The calendar is written first; the
/// status mirror follows best effort. Cancelling an already cancelled
/// appointment succeeds without another calendar write.
#[derive(Debug)]
pub struct CancelAppointmentUseCase {
    pub event_id: ID,
    pub token: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub event: CalendarEvent,
    pub changed: bool,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    Token(CapabilityError),
    NotFound(ID),
    NotCancellable(AppointmentStatus),
    CalendarUnavailable,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CancelAppointmentUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &PlenaContext) -> Result<Self::Response, Self::Errors> {
        verify_token(ctx, &self.token, &self.event_id).map_err(UseCaseErrors::Token)?;

        let mut event = ctx
            .calendar
            .get_event(&self.event_id)
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))?;

        let status = derive_status(&event);
        // A client backing out of a pending request declines it.
        let action = if status == AppointmentStatus::Pending {
            AppointmentAction::Decline
        } else {
            AppointmentAction::Cancel
        };

        match status.transition(action) {
            Transition::Changed(AppointmentStatus::Cancelled) => {
                ctx.calendar.cancel_event(&self.event_id).await.map_err(|e| {
                    error!("Calendar provider error: {:?}", e);
                    UseCaseErrors::CalendarUnavailable
                })?;
                event.status = EventStatus::Cancelled;

                mirror_status(
                    ctx,
                    AppointmentRecord {
                        calendar_event_id: event.id.clone(),
                        status: AppointmentStatus::Cancelled,
                        confirmed_at: None,
                        cancelled_at: Some(ctx.sys.get_datetime()),
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
            _ => Err(UseCaseErrors::NotCancellable(status)),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyOwnerOnCancellation)]
    }
}

pub struct NotifyOwnerOnCancellation;

#[async_trait::async_trait(?Send)]
impl Subscriber<CancelAppointmentUseCase> for NotifyOwnerOnCancellation {
    async fn notify(&self, res: &UseCaseRes, ctx: &PlenaContext) {
        if !res.changed {
            return;
        }
        ctx.notifier
            .notify(&BookingNotification::AppointmentCancelled {
                event_id: res.event.id.to_string(),
                title: res.event.tag().clean_title,
            })
            .await;
    }
}
