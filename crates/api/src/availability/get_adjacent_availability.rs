use super::{busy_for_scope, MILLIS_PER_MINUTE};
use crate::availability::get_availability::parse_durations;
use crate::{
    error::PlenaError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use plena_booking_api_structs::get_adjacent_availability::*;
use plena_booking_domain::{
    build_adjacent_availability, tag, Availability, CalendarEvent, EventStatus,
    SlotGeneratorOptions, TimeInterval, ID,
};
use plena_booking_infra::PlenaContext;
use tracing::error;

fn handle_error(e: UseCaseErrors) -> PlenaError {
    match e {
        UseCaseErrors::NamespaceNotFound(slug) => {
            PlenaError::NotFound(format!("The namespace: {}, was not found.", slug))
        }
        UseCaseErrors::AnchorNotFound(event_id) => PlenaError::NotFound(format!(
            "The anchor event with id: {}, was not found.",
            event_id
        )),
        UseCaseErrors::AnchorNotUsable(reason) => PlenaError::BadClientData(reason),
        UseCaseErrors::InvalidDuration(duration) => PlenaError::BadClientData(format!(
            "The duration: {} minutes, is not bookable here.",
            duration
        )),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub async fn get_adjacent_availability_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = GetAdjacentAvailabilityUseCase {
        namespace: path_params.namespace.clone(),
        event_id: query_params.event_id.clone(),
        durations: parse_durations(&query_params.durations)?,
    };

    execute(usecase, &ctx)
        .await
        .map(|availability| HttpResponse::Ok().json(APIResponse::new(availability)))
        .map_err(handle_error)
}

/// Offers slots directly following an existing appointment, on a finer
/// grid than the regular availability page.
#[derive(Debug)]
pub struct GetAdjacentAvailabilityUseCase {
    pub namespace: String,
    pub event_id: ID,
    pub durations: Option<Vec<i64>>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NamespaceNotFound(String),
    AnchorNotFound(ID),
    AnchorNotUsable(String),
    InvalidDuration(i64),
    CalendarUnavailable,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAdjacentAvailabilityUseCase {
    type Response = Availability;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &PlenaContext) -> Result<Self::Response, Self::Errors> {
        let settings = ctx
            .config
            .namespace(&self.namespace)
            .ok_or_else(|| UseCaseErrors::NamespaceNotFound(self.namespace.clone()))?;

        let durations = match &self.durations {
            Some(durations) => {
                for duration in durations {
                    if !settings.allowed_durations.contains(duration) {
                        return Err(UseCaseErrors::InvalidDuration(*duration));
                    }
                }
                durations.clone()
            }
            None => settings.allowed_durations.clone(),
        };

        let anchor: CalendarEvent = ctx
            .calendar
            .get_event(&self.event_id)
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?
            .ok_or_else(|| UseCaseErrors::AnchorNotFound(self.event_id.clone()))?;

        if anchor.status == EventStatus::Cancelled {
            return Err(UseCaseErrors::AnchorNotUsable(
                "The anchor event is cancelled".to_string(),
            ));
        }
        if !tag::belongs_to_namespace(&anchor.title, &anchor.description, &settings.slug) {
            return Err(UseCaseErrors::AnchorNotUsable(format!(
                "The anchor event does not belong to the namespace: {}",
                settings.slug
            )));
        }

        let padding = settings.padding * MILLIS_PER_MINUTE;
        let lookahead = ctx.config.adjacent_lookahead;
        let max_duration = durations.iter().max().copied().unwrap_or(0) * MILLIS_PER_MINUTE;
        let range = TimeInterval::new(anchor.end_ts, anchor.end_ts + lookahead + max_duration)
            .map_err(|_| {
                UseCaseErrors::AnchorNotUsable("The anchor event has no end".to_string())
            })?;

        let events = ctx
            .calendar
            .list_events(&range.padded(padding))
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?;
        let (busy, containers) = busy_for_scope(&events, settings);

        let now = ctx.sys.get_timestamp_millis();
        let base = SlotGeneratorOptions {
            range,
            duration: 0,
            interval: ctx.config.adjacent_interval,
            lead_time: settings.lead_time * MILLIS_PER_MINUTE,
            padding,
            now,
            timezone: settings.timezone,
        };

        Ok(build_adjacent_availability(
            &busy,
            &containers,
            settings.open_hours.as_ref(),
            &anchor,
            lookahead,
            &base,
            &durations,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_util::{setup_ctx, HOUR};

    const MINUTE: i64 = 1000 * 60;

    fn member_event(start_ts: i64, end_ts: i64) -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            title: "free-30__EVENT__MEMBER__ consult".into(),
            description: String::new(),
            start_ts,
            end_ts,
            timezone: chrono_tz::UTC,
            status: EventStatus::Confirmed,
            location: None,
        }
    }

    #[actix_web::main]
    #[test]
    async fn offers_slots_on_a_fine_grid_after_the_anchor() {
        let anchor = member_event(9 * HOUR, 10 * HOUR);
        let event_id = anchor.id.clone();
        let (ctx, _) = setup_ctx(vec![anchor], 0);

        let availability = GetAdjacentAvailabilityUseCase {
            namespace: "free-30".into(),
            event_id,
            durations: Some(vec![30]),
        }
        .execute(&ctx)
        .await
        .expect("To get adjacent availability");

        let starts: Vec<i64> = availability.slots_by_duration[&30]
            .iter()
            .map(|slot| slot.start_ts)
            .collect();
        // 15-minute grid within the 30-minute lookahead.
        assert_eq!(
            starts,
            vec![10 * HOUR, 10 * HOUR + 15 * MINUTE, 10 * HOUR + 30 * MINUTE]
        );
    }

    #[actix_web::main]
    #[test]
    async fn missing_anchor_is_not_found() {
        let (ctx, _) = setup_ctx(Vec::new(), 0);

        let res = GetAdjacentAvailabilityUseCase {
            namespace: "free-30".into(),
            event_id: ID::new(),
            durations: None,
        }
        .execute(&ctx)
        .await;

        assert!(matches!(res, Err(UseCaseErrors::AnchorNotFound(_))));
    }

    #[actix_web::main]
    #[test]
    async fn anchors_from_other_namespaces_are_rejected() {
        let mut anchor = member_event(9 * HOUR, 10 * HOUR);
        anchor.title = "paid-massage__EVENT__MEMBER__ massage".into();
        let event_id = anchor.id.clone();
        let (ctx, _) = setup_ctx(vec![anchor], 0);

        let res = GetAdjacentAvailabilityUseCase {
            namespace: "free-30".into(),
            event_id,
            durations: None,
        }
        .execute(&ctx)
        .await;

        assert!(matches!(res, Err(UseCaseErrors::AnchorNotUsable(_))));
    }
}
