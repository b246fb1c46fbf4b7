use super::{busy_for_scope, MILLIS_PER_MINUTE};
use crate::{
    error::PlenaError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono_tz::Tz;
use plena_booking_api_structs::get_availability::*;
use plena_booking_domain::{
    build_availability, validate_availability_query, Availability, AvailabilityQuery,
    AvailabilityQueryError, SlotGeneratorOptions,
};
use plena_booking_infra::PlenaContext;
use std::str::FromStr;
use tracing::error;

fn handle_error(e: UseCaseErrors) -> PlenaError {
    match e {
        UseCaseErrors::NamespaceNotFound(slug) => {
            PlenaError::NotFound(format!("The namespace: {}, was not found.", slug))
        }
        UseCaseErrors::InvalidQuery(e) => PlenaError::BadClientData(match e {
            AvailabilityQueryError::InvalidDate(date) => {
                format!("Invalid date: {}. Expected format: YYYY-M-D", date)
            }
            AvailabilityQueryError::InvalidTimespan => {
                "The start date must be before the end date".to_string()
            }
            AvailabilityQueryError::InvalidDuration(duration) => {
                format!("The duration: {} minutes, is not bookable here.", duration)
            }
        }),
        UseCaseErrors::QueryTooLong { limit } => PlenaError::BadClientData(format!(
            "The timespan is too long. It cannot exceed {} millis.",
            limit
        )),
        UseCaseErrors::CalendarUnavailable => PlenaError::InternalError,
    }
}

pub(crate) fn parse_durations(raw: &Option<String>) -> Result<Option<Vec<i64>>, PlenaError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
            .map_err(|_| {
                PlenaError::BadClientData(format!(
                    "Invalid durations: {}. Expected a comma separated list of minutes.",
                    raw
                ))
            }),
    }
}

pub(crate) fn parse_timezone(raw: &Option<String>) -> Result<Option<Tz>, PlenaError> {
    match raw {
        None => Ok(None),
        Some(raw) => Tz::from_str(raw)
            .map(Some)
            .map_err(|_| PlenaError::BadClientData(format!("Invalid timezone: {}", raw))),
    }
}

pub async fn get_availability_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<PlenaContext>,
) -> Result<HttpResponse, PlenaError> {
    let usecase = GetAvailabilityUseCase {
        namespace: path_params.namespace.clone(),
        start_date: query_params.start_date.clone(),
        end_date: query_params.end_date.clone(),
        timezone: parse_timezone(&query_params.timezone)?,
        durations: parse_durations(&query_params.durations)?,
    };

    execute(usecase, &ctx)
        .await
        .map(|availability| HttpResponse::Ok().json(APIResponse::new(availability)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct GetAvailabilityUseCase {
    pub namespace: String,
    pub start_date: String,
    pub end_date: String,
    pub timezone: Option<Tz>,
    /// Requested durations in minutes. Defaults to every duration the
    /// namespace allows.
    pub durations: Option<Vec<i64>>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NamespaceNotFound(String),
    InvalidQuery(AvailabilityQueryError),
    QueryTooLong { limit: i64 },
    CalendarUnavailable,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAvailabilityUseCase {
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
                        return Err(UseCaseErrors::InvalidQuery(
                            AvailabilityQueryError::InvalidDuration(*duration),
                        ));
                    }
                }
                durations.clone()
            }
            None => settings.allowed_durations.clone(),
        };
        let timezone = self.timezone.unwrap_or(settings.timezone);

        let query = AvailabilityQuery {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            timezone: Some(timezone),
            durations: durations.clone(),
        };
        let range = validate_availability_query(&query).map_err(UseCaseErrors::InvalidQuery)?;

        let limit = ctx.config.availability_query_duration_limit;
        if range.duration_millis() > limit {
            return Err(UseCaseErrors::QueryTooLong { limit });
        }

        let now = ctx.sys.get_timestamp_millis();
        let cache_key = format!(
            "{}:{}:{}:{}:{:?}",
            self.namespace,
            range.start_ts(),
            range.end_ts(),
            timezone,
            durations
        );
        if let Some(cached) = ctx.availability_cache.get(&cache_key, now) {
            return Ok(cached);
        }

        let padding = settings.padding * MILLIS_PER_MINUTE;
        // Events just outside the range still matter through padding.
        let events = ctx
            .calendar
            .list_events(&range.padded(padding))
            .await
            .map_err(|e| {
                error!("Calendar provider error: {:?}", e);
                UseCaseErrors::CalendarUnavailable
            })?;

        let (busy, containers) = busy_for_scope(&events, settings);
        let base = SlotGeneratorOptions {
            range,
            duration: 0,
            interval: 0,
            lead_time: settings.lead_time * MILLIS_PER_MINUTE,
            padding,
            now,
            timezone,
        };
        let availability = build_availability(
            &busy,
            &containers,
            settings.open_hours.as_ref(),
            &base,
            &durations,
        );

        ctx.availability_cache
            .insert(cache_key, availability.clone(), now);

        Ok(availability)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_util::{setup_ctx, HOUR};
    use plena_booking_domain::{CalendarEvent, EventStatus, ID};

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

    fn usecase() -> GetAvailabilityUseCase {
        GetAvailabilityUseCase {
            namespace: "free-30".into(),
            start_date: "1970-1-1".into(),
            end_date: "1970-1-1".into(),
            timezone: Some(chrono_tz::UTC),
            durations: Some(vec![60]),
        }
    }

    #[actix_web::main]
    #[test]
    async fn unknown_namespace_is_rejected() {
        let (ctx, _) = setup_ctx(Vec::new(), 0);
        let mut uc = usecase();
        uc.namespace = "nope".into();

        assert!(matches!(
            uc.execute(&ctx).await,
            Err(UseCaseErrors::NamespaceNotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn busy_events_remove_their_slots() {
        let (ctx, _) = setup_ctx(vec![member_event(HOUR, 2 * HOUR)], 0);

        let availability = usecase().execute(&ctx).await.expect("To get availability");
        // 24 hourly candidates in the day, one blocked.
        assert_eq!(availability.slot_count(60), 23);
        assert!(availability.slots_by_duration[&60]
            .iter()
            .all(|slot| slot.start_ts != HOUR));
    }

    #[actix_web::main]
    #[test]
    async fn durations_outside_the_namespace_are_rejected() {
        let (ctx, _) = setup_ctx(Vec::new(), 0);
        let mut uc = usecase();
        uc.durations = Some(vec![45]);

        assert!(matches!(
            uc.execute(&ctx).await,
            Err(UseCaseErrors::InvalidQuery(
                AvailabilityQueryError::InvalidDuration(45)
            ))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn repeated_queries_are_served_from_cache() {
        let (ctx, calendar) = setup_ctx(Vec::new(), 0);

        let first = usecase().execute(&ctx).await.expect("To get availability");
        // A new busy event appears, but the TTL has not passed.
        calendar.insert(member_event(0, 12 * HOUR));
        let second = usecase().execute(&ctx).await.expect("To get availability");

        assert_eq!(first.counts(), second.counts());
    }

    #[actix_web::main]
    #[test]
    async fn overlong_timespans_are_rejected() {
        let (ctx, _) = setup_ctx(Vec::new(), 0);
        let mut uc = usecase();
        uc.end_date = "1970-3-15".into();

        assert!(matches!(
            uc.execute(&ctx).await,
            Err(UseCaseErrors::QueryTooLong { .. })
        ));
    }
}
