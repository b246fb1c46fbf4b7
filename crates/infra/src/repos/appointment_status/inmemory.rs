use super::IAppointmentStatusRepo;
use plena_booking_domain::{AppointmentRecord, ID};
use std::sync::Mutex;

pub struct InMemoryAppointmentStatusRepo {
    records: Mutex<Vec<AppointmentRecord>>,
}

impl InMemoryAppointmentStatusRepo {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryAppointmentStatusRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IAppointmentStatusRepo for InMemoryAppointmentStatusRepo {
    async fn upsert(&self, record: &AppointmentRecord) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.calendar_event_id == record.calendar_event_id)
        {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn find(&self, calendar_event_id: &ID) -> Option<AppointmentRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.calendar_event_id == *calendar_event_id)
            .cloned()
    }

    async fn delete(&self, calendar_event_id: &ID) -> Option<AppointmentRecord> {
        let mut records = self.records.lock().unwrap();
        let pos = records
            .iter()
            .position(|r| r.calendar_event_id == *calendar_event_id)?;
        Some(records.remove(pos))
    }
}
