mod inmemory;
mod postgres;

pub use inmemory::InMemoryAppointmentStatusRepo;
use plena_booking_domain::{AppointmentRecord, ID};
pub use postgres::PostgresAppointmentStatusRepo;

/// Mirror of appointment statuses keyed by calendar event id. The calendar
/// stays authoritative; rows here exist for cheap dashboard reads and may
/// lag behind or be missing entirely.
#[async_trait::async_trait]
pub trait IAppointmentStatusRepo: Send + Sync {
    async fn upsert(&self, record: &AppointmentRecord) -> anyhow::Result<()>;
    async fn find(&self, calendar_event_id: &ID) -> Option<AppointmentRecord>;
    async fn delete(&self, calendar_event_id: &ID) -> Option<AppointmentRecord>;
}
