use crate::appointment::get_appointment::verify_token;
use crate::{
    error::PlenaError,
    shared::usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use plena_booking_api_structs::edit_appointment::*;
use plena_booking_domain::{
    derive_status, AppointmentAction, AppointmentStatus, CalendarEvent, CapabilityError,
    EventPatch, TimeInterval, Transition, ID,
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
        UseCaseErrors::NotEditable(status) => PlenaError::Conflict(format!(
            "Only confirmed appointments can be edited. Current status: {:?}",
            status
        )),
        UseCaseErrors::InvalidTimes => PlenaError::BadClientData(
            "The appointment start must be before its end".to_string(),
        ),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub async fn edit_appointment_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let body = body.into_inner();
    let usecase = EditAppointmentUseCase {
        event_id: path_params.event_id.clone(),
        token: body.token,
        patch: EventPatch {
            start_ts: body.start_ts,
            end_ts: body.end_ts,
            location: body.location,
            description: body.description,
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.event)))
        .map_err(handle_error)
}

/// Applies an allow-listed patch through a capability link. The title and
/// its embedded markers are never editable this way.
#[derive(Debug)]
pub struct EditAppointmentUseCase {
    pub event_id: ID,
    pub token: String,
    pub patch: EventPatch,
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
    NotEditable(AppointmentStatus),
    InvalidTimes,
    CalendarUnavailable,
}

#[async_trait::async_trait(?Send)]
impl UseCase for EditAppointmentUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &PlenaContext) -> Result<Self::Response, Self::Errors> {
        verify_token(ctx, &self.token, &self.event_id).map_err(UseCaseErrors::Token)?;

        let event = ctx
            .calendar
            .get_event(&self.event_id)
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))?;

        let status = derive_status(&event);
        if status.transition(AppointmentAction::Edit) != Transition::Unchanged {
            return Err(UseCaseErrors::NotEditable(status));
        }

        if self.patch.is_empty() {
            return Ok(UseCaseRes {
                event,
                changed: false,
            });
        }

        let mut patched = event;
        self.patch.apply_to(&mut patched);
        TimeInterval::new(patched.start_ts, patched.end_ts)
            .map_err(|_| UseCaseErrors::InvalidTimes)?;

        let event = ctx.calendar.update_event(&patched).await.map_err(|e| {
            error!("Calendar provider error: {:?}", e);
            UseCaseErrors::CalendarUnavailable
        })?;

        Ok(UseCaseRes {
            event,
            changed: true,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyOwnerOnEdit)]
    }
}

pub struct NotifyOwnerOnEdit;

#[async_trait::async_trait(?Send)]
impl Subscriber<EditAppointmentUseCase> for NotifyOwnerOnEdit {
    async fn notify(&self, res: &UseCaseRes, ctx: &PlenaContext) {
        if !res.changed {
            return;
        }
        ctx.notifier
            .notify(&BookingNotification::AppointmentEdited {
                event_id: res.event.id.to_string(),
                title: res.event.tag().clean_title,
            })
            .await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_util::{setup_ctx, HOUR};
    use chrono::{Duration, Utc};
    use plena_booking_domain::{CapabilityClaims, CapabilityCodec, EventStatus};

    fn event(title: &str) -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            title: title.into(),
            description: String::new(),
            start_ts: 9 * HOUR,
            end_ts: 10 * HOUR,
            timezone: chrono_tz::UTC,
            status: EventStatus::Confirmed,
            location: None,
        }
    }

    fn token_for(event_id: &ID) -> String {
        CapabilityCodec::new("test-link-secret").issue(&CapabilityClaims {
            event_id: event_id.clone(),
            email: "jane@example.com".into(),
            expires_at: Utc::now() + Duration::days(7),
        })
    }

    #[actix_web::main]
    #[test]
    async fn applies_the_patch_and_keeps_the_title() {
        let e = event("free-30__EVENT__MEMBER__ 30 minute consult with Jane Smith");
        let event_id = e.id.clone();
        let original_title = e.title.clone();
        let (ctx, calendar) = setup_ctx(vec![e], Utc::now().timestamp_millis());

        let res = EditAppointmentUseCase {
            event_id: event_id.clone(),
            token: token_for(&event_id),
            patch: EventPatch {
                start_ts: Some(11 * HOUR),
                end_ts: Some(12 * HOUR),
                location: Some("Studio B".into()),
                description: None,
            },
        }
        .execute(&ctx)
        .await
        .expect("To edit appointment");

        assert!(res.changed);
        assert_eq!(res.event.start_ts, 11 * HOUR);
        assert_eq!(res.event.location.as_deref(), Some("Studio B"));
        assert_eq!(res.event.title, original_title);
        assert_eq!(calendar.write_count(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn empty_patches_do_not_write_to_the_calendar() {
        let e = event("free-30__EVENT__MEMBER__ consult");
        let event_id = e.id.clone();
        let (ctx, calendar) = setup_ctx(vec![e], Utc::now().timestamp_millis());

        let res = EditAppointmentUseCase {
            event_id: event_id.clone(),
            token: token_for(&event_id),
            patch: EventPatch::default(),
        }
        .execute(&ctx)
        .await
        .expect("To accept the empty patch");
        assert!(!res.changed);
        assert_eq!(calendar.write_count(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn pending_requests_cannot_be_edited() {
        let e = event("REQUEST: free-30__EVENT__MEMBER__ consult");
        let event_id = e.id.clone();
        let (ctx, _) = setup_ctx(vec![e], Utc::now().timestamp_millis());

        let res = EditAppointmentUseCase {
            event_id: event_id.clone(),
            token: token_for(&event_id),
            patch: EventPatch {
                location: Some("Studio B".into()),
                ..Default::default()
            },
        }
        .execute(&ctx)
        .await;

        assert!(matches!(
            res,
            Err(UseCaseErrors::NotEditable(AppointmentStatus::Pending))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn reversed_times_are_rejected() {
        let e = event("free-30__EVENT__MEMBER__ consult");
        let event_id = e.id.clone();
        let (ctx, calendar) = setup_ctx(vec![e], Utc::now().timestamp_millis());

        let res = EditAppointmentUseCase {
            event_id: event_id.clone(),
            token: token_for(&event_id),
            patch: EventPatch {
                start_ts: Some(12 * HOUR),
                end_ts: Some(11 * HOUR),
                ..Default::default()
            },
        }
        .execute(&ctx)
        .await;

        assert!(matches!(res, Err(UseCaseErrors::InvalidTimes)));
        assert_eq!(calendar.write_count(), 0);
    }
}
