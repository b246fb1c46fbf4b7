use crate::{
    error::PlenaError,
    shared::links::issue_links,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono::Duration;
use plena_booking_api_structs::create_appointment_links::*;
use plena_booking_api_structs::dtos::AppointmentLinksDTO;
use plena_booking_domain::{tag::extract_approval_links, CapabilityCodec, ID};
use plena_booking_infra::PlenaContext;
use tracing::{error, warn};

fn handle_error(e: UseCaseErrors) -> PlenaError {
    match e {
        UseCaseErrors::NotFound(event_id) => PlenaError::NotFound(format!(
            "The calendar event with id: {}, was not found.",
            event_id
        )),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub async fn create_appointment_links_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = CreateAppointmentLinksUseCase {
        event_id: path_params.event_id.clone(),
        email: body.email.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|links| HttpResponse::Ok().json(APIResponse { links }))
        .map_err(handle_error)
}

/// Issues the complete link set for one appointment: a capability token
/// for the client and approval hash links for the business owner. The
/// approval links are also embedded into the event description, once, so
/// the owner's calendar itself carries them.
#[derive(Debug)]
pub struct CreateAppointmentLinksUseCase {
    pub event_id: ID,
    pub email: String,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    CalendarUnavailable,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateAppointmentLinksUseCase {
    type Response = AppointmentLinksDTO;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &PlenaContext) -> Result<Self::Response, Self::Errors> {
        let mut event = ctx
            .calendar
            .get_event(&self.event_id)
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))?;

        let codec = CapabilityCodec::new(&ctx.config.link_secret);
        let expires_at = ctx.sys.get_datetime() + Duration::milliseconds(ctx.config.link_expiry);
        let links = issue_links(
            &codec,
            &ctx.config.public_base_url,
            &self.event_id,
            &self.email,
            expires_at,
        );

        // Reissuing links must not stack approval anchors in the
        // description.
        if extract_approval_links(&event.description).accept_url.is_none() {
            event.description = format!(
                "{}\n<a href=\"{}\">Confirm</a> <a href=\"{}\">Decline</a>",
                event.description, links.confirm_url, links.decline_url
            );
            if let Err(e) = ctx.calendar.update_event(&event).await {
                warn!("Failed to embed approval links in the event description: {:?}", e);
            }
        }

        Ok(links)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_util::{setup_ctx, HOUR};
    use plena_booking_domain::{CalendarEvent, EventStatus};
    use plena_booking_infra::ICalendarApi;

    fn request_event() -> CalendarEvent {
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

    #[actix_web::main]
    #[test]
    async fn issues_links_and_embeds_the_approval_anchors_once() {
        let event = request_event();
        let event_id = event.id.clone();
        let (ctx, calendar) = setup_ctx(vec![event], 0);

        let links = CreateAppointmentLinksUseCase {
            event_id: event_id.clone(),
            email: "jane@example.com".into(),
        }
        .execute(&ctx)
        .await
        .expect("To issue links");
        assert!(links.view_url.contains(&links.token));

        let updated = calendar
            .get_event(&event_id)
            .await
            .unwrap()
            .expect("To find event");
        let approval = extract_approval_links(&updated.description);
        assert!(approval.accept_url.is_some());
        assert!(approval.decline_url.is_some());
        assert_eq!(calendar.write_count(), 1);

        // A second issuance leaves the description alone.
        CreateAppointmentLinksUseCase {
            event_id: event_id.clone(),
            email: "jane@example.com".into(),
        }
        .execute(&ctx)
        .await
        .expect("To reissue links");
        assert_eq!(calendar.write_count(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn unknown_events_are_not_found() {
        let (ctx, _) = setup_ctx(Vec::new(), 0);

        let res = CreateAppointmentLinksUseCase {
            event_id: ID::new(),
            email: "jane@example.com".into(),
        }
        .execute(&ctx)
        .await;

        assert!(matches!(res, Err(UseCaseErrors::NotFound(_))));
    }
}
