use super::IAppointmentStatusRepo;
use chrono::{DateTime, Utc};
use plena_booking_domain::{AppointmentRecord, AppointmentStatus, ID};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresAppointmentStatusRepo {
    pool: PgPool,
}

impl PostgresAppointmentStatusRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppointmentStatusRaw {
    calendar_event_id: String,
    status: String,
    confirmed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

fn status_to_str(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "pending",
        AppointmentStatus::Confirmed => "confirmed",
        AppointmentStatus::Cancelled => "cancelled",
        AppointmentStatus::Completed => "completed",
    }
}

fn status_from_str(status: &str) -> anyhow::Result<AppointmentStatus> {
    match status {
        "pending" => Ok(AppointmentStatus::Pending),
        "confirmed" => Ok(AppointmentStatus::Confirmed),
        "cancelled" => Ok(AppointmentStatus::Cancelled),
        "completed" => Ok(AppointmentStatus::Completed),
        _ => Err(anyhow::anyhow!("Unknown appointment status: {}", status)),
    }
}

impl TryFrom<AppointmentStatusRaw> for AppointmentRecord {
    type Error = anyhow::Error;

    fn try_from(raw: AppointmentStatusRaw) -> anyhow::Result<Self> {
        Ok(Self {
            calendar_event_id: ID::from_str(&raw.calendar_event_id)?,
            status: status_from_str(&raw.status)?,
            confirmed_at: raw.confirmed_at,
            cancelled_at: raw.cancelled_at,
        })
    }
}

#[async_trait::async_trait]
impl IAppointmentStatusRepo for PostgresAppointmentStatusRepo {
    async fn upsert(&self, record: &AppointmentRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointment_statuses(calendar_event_id, status, confirmed_at, cancelled_at)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (calendar_event_id) DO UPDATE
            SET status = $2, confirmed_at = $3, cancelled_at = $4
            "#,
        )
        .bind(record.calendar_event_id.to_string())
        .bind(status_to_str(record.status))
        .bind(record.confirmed_at)
        .bind(record.cancelled_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, calendar_event_id: &ID) -> Option<AppointmentRecord> {
        let raw: AppointmentStatusRaw = sqlx::query_as(
            r#"
            SELECT * FROM appointment_statuses AS a
            WHERE a.calendar_event_id = $1
            "#,
        )
        .bind(calendar_event_id.to_string())
        .fetch_one(&self.pool)
        .await
        .ok()?;

        match raw.try_into() {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Corrupt appointment status row: {:?}", e);
                None
            }
        }
    }

    async fn delete(&self, calendar_event_id: &ID) -> Option<AppointmentRecord> {
        let raw: AppointmentStatusRaw = sqlx::query_as(
            r#"
            DELETE FROM appointment_statuses AS a
            WHERE a.calendar_event_id = $1
            RETURNING *
            "#,
        )
        .bind(calendar_event_id.to_string())
        .fetch_one(&self.pool)
        .await
        .ok()?;

        raw.try_into().ok()
    }
}
