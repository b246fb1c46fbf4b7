use crate::appointment::mirror_status;
use crate::{
    error::PlenaError,
    shared::links::decode_hash_link,
    shared::usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use plena_booking_api_structs::decline_request::*;
use plena_booking_domain::{
    derive_status, AppointmentAction, AppointmentRecord, AppointmentStatus, CalendarEvent,
    CapabilityCodec, EventStatus, Transition,
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

pub async fn decline_request_controller(
    query_params: web::Query<QueryParams>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = DeclineRequestUseCase {
        data: query_params.data.clone(),
        key: query_params.key.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.event)))
        .map_err(handle_error)
}

/// Owner-side rejection of a pending request. The event is cancelled at
/// the calendar; a confirmed appointment cannot be declined this way.
#[derive(Debug)]
pub struct DeclineRequestUseCase {
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
impl UseCase for DeclineRequestUseCase {
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
        match status.transition(AppointmentAction::Decline) {
            Transition::Changed(AppointmentStatus::Cancelled) => {
                ctx.calendar
                    .cancel_event(&payload.event_id)
                    .await
                    .map_err(|e| {
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
            _ => Err(UseCaseErrors::NotPending(status)),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyClientOnDecline)]
    }
}

pub struct NotifyClientOnDecline;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeclineRequestUseCase> for NotifyClientOnDecline {
    async fn notify(&self, res: &UseCaseRes, ctx: &PlenaContext) {
        if !res.changed {
            return;
        }
        ctx.notifier
            .notify(&BookingNotification::RequestDeclined {
                event_id: res.event.id.to_string(),
                title: res.event.tag().clean_title,
            })
            .await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::links::encode_hash_link;
    use crate::shared::test_util::{setup_ctx, HOUR};
    use chrono::Utc;
    use plena_booking_domain::{LinkPayload, ID};

    fn pending_event() -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            title: "REQUEST: free-30__EVENT__MEMBER__ 30 minute consult with Jane Smith".into(),
            description: String::new(),
            start_ts: 9 * HOUR,
            end_ts: 10 * HOUR,
            timezone: chrono_tz::UTC,
            status: EventStatus::Confirmed,
            location: None,
        }
    }

    fn hash_link(event_id: &ID) -> (String, String) {
        encode_hash_link(
            &CapabilityCodec::new("test-link-secret"),
            &LinkPayload {
                event_id: event_id.clone(),
                email: None,
            },
        )
    }

    #[actix_web::main]
    #[test]
    async fn declining_cancels_the_event_once() {
        let event = pending_event();
        let event_id = event.id.clone();
        let (ctx, calendar) = setup_ctx(vec![event], Utc::now().timestamp_millis());
        let (data, key) = hash_link(&event_id);

        let res = DeclineRequestUseCase {
            data: data.clone(),
            key: key.clone(),
        }
        .execute(&ctx)
        .await
        .expect("To decline request");
        assert!(res.changed);
        assert_eq!(res.event.status, EventStatus::Cancelled);
        assert_eq!(calendar.write_count(), 1);

        let second = DeclineRequestUseCase { data, key }
            .execute(&ctx)
            .await
            .expect("To decline request again");
        assert!(!second.changed);
        assert_eq!(calendar.write_count(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn confirmed_appointments_cannot_be_declined() {
        let mut event = pending_event();
        event.title = "free-30__EVENT__MEMBER__ 30 minute consult with Jane Smith".into();
        let event_id = event.id.clone();
        let (ctx, calendar) = setup_ctx(vec![event], Utc::now().timestamp_millis());
        let (data, key) = hash_link(&event_id);

        let res = DeclineRequestUseCase { data, key }.execute(&ctx).await;
        assert!(matches!(
            res,
            Err(UseCaseErrors::NotPending(AppointmentStatus::Confirmed))
        ));
        assert_eq!(calendar.write_count(), 0);
    }
}
