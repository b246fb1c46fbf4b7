mod appointment_status;

pub use appointment_status::{
    IAppointmentStatusRepo, InMemoryAppointmentStatusRepo, PostgresAppointmentStatusRepo,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub appointment_statuses: Arc<dyn IAppointmentStatusRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            appointment_statuses: Arc::new(PostgresAppointmentStatusRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            appointment_statuses: Arc::new(InMemoryAppointmentStatusRepo::new()),
        }
    }
}
