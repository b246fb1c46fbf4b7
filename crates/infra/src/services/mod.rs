mod calendar;
mod notifier;

pub use calendar::{CalendarRestApi, ICalendarApi, InMemoryCalendarApi};
pub use notifier::{BookingNotification, INotifier, NoopNotifier, WebhookNotifier};
