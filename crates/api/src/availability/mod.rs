mod get_adjacent_availability;
mod get_availability;

use actix_web::web;
use plena_booking_domain::{
    filter_for_namespace, filter_general, BlockingScope, BusyIntervals, CalendarEvent,
    NamespaceSettings,
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/availability/{namespace}",
        web::get().to(get_availability::get_availability_controller),
    );
    cfg.route(
        "/availability/{namespace}/adjacent",
        web::get().to(get_adjacent_availability::get_adjacent_availability_controller),
    );
}

/// Classifies raw calendar events into coalesced busy time plus the
/// namespace's containers, honoring the namespace's blocking scope.
pub(crate) fn busy_for_scope(
    events: &[CalendarEvent],
    settings: &NamespaceSettings,
) -> (BusyIntervals, Vec<CalendarEvent>) {
    let namespace_schedule = filter_for_namespace(events, &settings.slug);
    let busy = match settings.blocking_scope {
        BlockingScope::Event => namespace_schedule.busy,
        BlockingScope::General => filter_general(events).busy,
    };
    (BusyIntervals::new(busy), namespace_schedule.containers)
}

pub(crate) const MILLIS_PER_MINUTE: i64 = 1000 * 60;
