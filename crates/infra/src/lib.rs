mod cache;
mod config;
mod repos;
mod services;
mod system;

pub use cache::TtlCache;
pub use config::Config;
use plena_booking_domain::Availability;
pub use repos::{IAppointmentStatusRepo, InMemoryAppointmentStatusRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticSys};
use tracing::info;

/// Key of a cached availability response: namespace slug plus the
/// serialized query.
pub type AvailabilityCache = TtlCache<String, Availability>;

#[derive(Clone)]
pub struct PlenaContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub calendar: Arc<dyn ICalendarApi>,
    pub notifier: Arc<dyn INotifier>,
    pub availability_cache: Arc<AvailabilityCache>,
}

impl PlenaContext {
    pub fn new(
        repos: Repos,
        config: Config,
        sys: Arc<dyn ISys>,
        calendar: Arc<dyn ICalendarApi>,
        notifier: Arc<dyn INotifier>,
    ) -> Self {
        let availability_cache = Arc::new(TtlCache::new(
            config.availability_cache_ttl,
            config.availability_cache_size,
        ));
        Self {
            repos,
            config,
            sys,
            calendar,
            notifier,
            availability_cache,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> PlenaContext {
    let config = Config::new();

    let repos = match std::env::var("DATABASE_URL") {
        Ok(connection_string) => Repos::create_postgres(&connection_string)
            .await
            .expect("Postgres credentials must be set and valid"),
        Err(_) => {
            info!("Did not find DATABASE_URL environment variable. Using in-memory repos.");
            Repos::create_inmemory()
        }
    };

    let calendar: Arc<dyn ICalendarApi> = match std::env::var("CALENDAR_API_URL") {
        Ok(base_url) => {
            let access_token = std::env::var("CALENDAR_API_TOKEN").unwrap_or_default();
            Arc::new(CalendarRestApi::new(base_url, access_token))
        }
        Err(_) => {
            info!("Did not find CALENDAR_API_URL environment variable. Using in-memory calendar.");
            Arc::new(InMemoryCalendarApi::new())
        }
    };

    let notifier: Arc<dyn INotifier> = match std::env::var("NOTIFY_WEBHOOK_URL") {
        Ok(webhook_url) => Arc::new(WebhookNotifier::new(webhook_url)),
        Err(_) => Arc::new(NoopNotifier),
    };

    PlenaContext::new(repos, config, Arc::new(RealSys {}), calendar, notifier)
}
