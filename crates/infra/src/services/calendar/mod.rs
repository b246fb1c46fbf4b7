mod rest_api;

use plena_booking_domain::{CalendarEvent, EventStatus, TimeInterval, ID};
pub use rest_api::CalendarRestApi;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The third-party calendar is the single source of truth for events.
/// Every mutation goes through here first; local state is only updated
/// after the calendar write succeeds.
#[async_trait::async_trait]
pub trait ICalendarApi: Send + Sync {
    async fn list_events(&self, range: &TimeInterval) -> anyhow::Result<Vec<CalendarEvent>>;
    async fn get_event(&self, event_id: &ID) -> anyhow::Result<Option<CalendarEvent>>;
    async fn update_event(&self, event: &CalendarEvent) -> anyhow::Result<CalendarEvent>;
    async fn cancel_event(&self, event_id: &ID) -> anyhow::Result<()>;
}

/// Calendar backed by process memory. Used in tests and when no external
/// calendar is configured. Counts writes so tests can assert that
/// idempotent retries do not touch the calendar again.
pub struct InMemoryCalendarApi {
    events: Mutex<Vec<CalendarEvent>>,
    write_count: AtomicUsize,
}

impl InMemoryCalendarApi {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            write_count: AtomicUsize::new(0),
        }
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            write_count: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, event: CalendarEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryCalendarApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICalendarApi for InMemoryCalendarApi {
    async fn list_events(&self, range: &TimeInterval) -> anyhow::Result<Vec<CalendarEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|event| match event.interval() {
                Ok(interval) => interval.intersects(range),
                Err(_) => false,
            })
            .cloned()
            .collect())
    }

    async fn get_event(&self, event_id: &ID) -> anyhow::Result<Option<CalendarEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events.iter().find(|event| event.id == *event_id).cloned())
    }

    async fn update_event(&self, event: &CalendarEvent) -> anyhow::Result<CalendarEvent> {
        let mut events = self.events.lock().unwrap();
        let existing = events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| anyhow::anyhow!("Event not found: {}", event.id))?;
        *existing = event.clone();
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(event.clone())
    }

    async fn cancel_event(&self, event_id: &ID) -> anyhow::Result<()> {
        let mut events = self.events.lock().unwrap();
        let existing = events
            .iter_mut()
            .find(|e| e.id == *event_id)
            .ok_or_else(|| anyhow::anyhow!("Event not found: {}", event_id))?;
        existing.status = EventStatus::Cancelled;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start_ts: i64, end_ts: i64) -> CalendarEvent {
        CalendarEvent {
            id: ID::new(),
            title: "Consult".into(),
            description: String::new(),
            start_ts,
            end_ts,
            timezone: chrono_tz::UTC,
            status: EventStatus::Confirmed,
            location: None,
        }
    }

    #[tokio::test]
    async fn lists_only_events_overlapping_the_range() {
        let api = InMemoryCalendarApi::with_events(vec![event(0, 1000), event(5000, 6000)]);

        let range = TimeInterval::new(500, 2000).unwrap();
        let listed = api.list_events(&range).await.expect("To list events");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].start_ts, 0);
    }

    #[tokio::test]
    async fn cancel_marks_the_event_and_counts_the_write() {
        let e = event(0, 1000);
        let id = e.id.clone();
        let api = InMemoryCalendarApi::with_events(vec![e]);

        api.cancel_event(&id).await.expect("To cancel event");
        let cancelled = api.get_event(&id).await.expect("To get event").unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);
        assert_eq!(api.write_count(), 1);
    }

    #[tokio::test]
    async fn updating_an_unknown_event_fails() {
        let api = InMemoryCalendarApi::new();
        assert!(api.update_event(&event(0, 1000)).await.is_err());
    }
}
