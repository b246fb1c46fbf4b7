use crate::event::{CalendarEvent, EventStatus};
use crate::interval::TimeInterval;
use crate::tag::{self, NamespaceRole};
use serde::{Deserialize, Serialize};

/// Policy choosing which calendar commitments reduce a namespace's
/// availability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockingScope {
    /// Only member events of the same namespace create busy time.
    /// Narrowest blocking, most availability.
    #[default]
    Event,
    /// Every non-container event on the calendar creates busy time,
    /// regardless of namespace.
    General,
}

/// Result of classifying raw calendar events for one namespace.
///
/// `busy` holds the raw per-event intervals of the members only. Containers
/// are returned separately and must never appear in `busy`: a container is
/// the umbrella its own bookable sub-slots nest inside, and counting it as
/// busy would make those sub-slots unavailable.
#[derive(Debug, Default)]
pub struct NamespaceSchedule {
    pub members: Vec<CalendarEvent>,
    pub containers: Vec<CalendarEvent>,
    pub busy: Vec<TimeInterval>,
}

/// Result of classifying raw calendar events under the general scope.
#[derive(Debug, Default)]
pub struct GeneralSchedule {
    pub blocking: Vec<CalendarEvent>,
    pub busy: Vec<TimeInterval>,
}

/// An event never blocks anything when it is the live-location sentinel or
/// already cancelled at the calendar.
fn is_schedulable(event: &CalendarEvent) -> bool {
    !event.tag().is_current_location && event.status != EventStatus::Cancelled
}

pub fn filter_for_namespace(events: &[CalendarEvent], namespace: &str) -> NamespaceSchedule {
    let mut schedule = NamespaceSchedule::default();

    for event in events {
        if !is_schedulable(event) {
            continue;
        }
        match tag::namespace_role(&event.title, &event.description, namespace) {
            NamespaceRole::Member => {
                if let Ok(interval) = event.interval() {
                    schedule.busy.push(interval);
                    schedule.members.push(event.clone());
                }
            }
            NamespaceRole::Container => schedule.containers.push(event.clone()),
            NamespaceRole::None => {}
        }
    }

    schedule
}

pub fn filter_general(events: &[CalendarEvent]) -> GeneralSchedule {
    let mut schedule = GeneralSchedule::default();

    for event in events {
        if !is_schedulable(event) {
            continue;
        }
        if tag::is_pure_container(&event.title, &event.description) {
            continue;
        }
        if let Ok(interval) = event.interval() {
            schedule.busy.push(interval);
            schedule.blocking.push(event.clone());
        }
    }

    schedule
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::entity::ID;

    fn event(title: &str, start_ts: i64, end_ts: i64) -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            title: title.to_string(),
            description: String::new(),
            start_ts,
            end_ts,
            timezone: chrono_tz::UTC,
            status: EventStatus::Confirmed,
            location: None,
        }
    }

    const HOUR: i64 = 1000 * 60 * 60;

    /// Two member/container pairs for each of two namespaces sharing the
    /// calendar, plus four plain personal events.
    fn shared_calendar() -> Vec<CalendarEvent> {
        vec![
            event("free-30__EVENT__MEMBER__ consult", HOUR, 2 * HOUR),
            event("free-30__EVENT__CONTAINER__ office day", 0, 8 * HOUR),
            event("paid-massage__EVENT__MEMBER__ massage", 3 * HOUR, 4 * HOUR),
            event("paid-massage__EVENT__CONTAINER__ clinic day", 0, 8 * HOUR),
            event("Dentist", 9 * HOUR, 10 * HOUR),
            event("Lunch", 11 * HOUR, 12 * HOUR),
            event("School run", 14 * HOUR, 15 * HOUR),
            event("Gym", 17 * HOUR, 18 * HOUR),
        ]
    }

    #[test]
    fn event_scope_counts_only_same_namespace_members() {
        let events = shared_calendar();

        let schedule = filter_for_namespace(&events, "free-30");
        assert_eq!(schedule.busy.len(), 1);
        assert_eq!(schedule.members.len(), 1);
        assert_eq!(schedule.containers.len(), 1);
    }

    #[test]
    fn general_scope_counts_every_non_container_commitment() {
        let events = shared_calendar();

        let schedule = filter_general(&events);
        // 2 members + 4 personal events; both containers excluded.
        assert_eq!(schedule.busy.len(), 6);
    }

    #[test]
    fn general_busy_is_a_superset_of_namespace_busy() {
        let events = shared_calendar();

        for namespace in ["free-30", "paid-massage", "unknown-ns"] {
            let ns_busy = filter_for_namespace(&events, namespace).busy.len();
            let general_busy = filter_general(&events).busy.len();
            assert!(general_busy >= ns_busy);
        }
    }

    #[test]
    fn dual_role_events_still_block_under_the_general_scope() {
        let mut events = shared_calendar();
        let mut dual = event("free-30__EVENT__MEMBER__ consult", 5 * HOUR, 6 * HOUR);
        dual.description = "free-30__EVENT__CONTAINER__".into();
        events.push(dual);

        // A member for the namespace, so it must count under both scopes.
        let ns_busy = filter_for_namespace(&events, "free-30").busy.len();
        let general_busy = filter_general(&events).busy.len();
        assert_eq!(ns_busy, 2);
        assert_eq!(general_busy, 7);
        assert!(general_busy >= ns_busy);
    }

    #[test]
    fn containers_never_appear_in_busy_under_either_scope() {
        let events = shared_calendar();

        let ns = filter_for_namespace(&events, "free-30");
        let container = &ns.containers[0];
        let container_interval = container.interval().unwrap();
        assert!(!ns.busy.contains(&container_interval));
        assert!(!filter_general(&events).busy.contains(&container_interval));
    }

    #[test]
    fn cancelled_events_do_not_block() {
        let mut events = shared_calendar();
        events[0].status = EventStatus::Cancelled;

        assert!(filter_for_namespace(&events, "free-30").busy.is_empty());
        assert_eq!(filter_general(&events).busy.len(), 5);
    }

    #[test]
    fn current_location_sentinel_is_excluded_everywhere() {
        let mut events = shared_calendar();
        events.push(event("CURRENT_LOCATION", 0, 24 * HOUR));

        assert_eq!(filter_general(&events).busy.len(), 6);
        assert_eq!(filter_for_namespace(&events, "free-30").busy.len(), 1);
    }

    #[test]
    fn tentative_events_block_conservatively() {
        let mut events = shared_calendar();
        events[4].status = EventStatus::Tentative;

        assert_eq!(filter_general(&events).busy.len(), 6);
    }
}
