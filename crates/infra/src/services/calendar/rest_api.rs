use super::ICalendarApi;
use chrono::DateTime;
use chrono_tz::Tz;
use plena_booking_domain::{CalendarEvent, EventStatus, TimeInterval, ID};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::error;

/// RFC3339 instant as the calendar provider transports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDateTime(String);

impl RemoteDateTime {
    pub fn from_timestamp_millis(timestamp: i64) -> Self {
        let datetime = DateTime::from_timestamp_millis(timestamp).unwrap_or_default();
        Self(datetime.to_rfc3339())
    }

    pub fn timestamp_millis(&self) -> anyhow::Result<i64> {
        Ok(DateTime::parse_from_rfc3339(&self.0)?.timestamp_millis())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEventDateTime {
    date_time: RemoteDateTime,
    time_zone: String,
}

impl RemoteEventDateTime {
    pub fn new(date_time_millis: i64, time_zone: &Tz) -> Self {
        Self {
            date_time: RemoteDateTime::from_timestamp_millis(date_time_millis),
            time_zone: time_zone.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub id: String,
    pub start: RemoteEventDateTime,
    pub end: RemoteEventDateTime,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl TryFrom<RemoteEvent> for CalendarEvent {
    type Error = anyhow::Error;

    fn try_from(remote: RemoteEvent) -> anyhow::Result<Self> {
        let timezone = Tz::from_str(&remote.start.time_zone).unwrap_or(chrono_tz::UTC);
        let status = match remote.status.as_deref() {
            Some("cancelled") => EventStatus::Cancelled,
            Some("tentative") => EventStatus::Tentative,
            _ => EventStatus::Confirmed,
        };
        Ok(Self {
            id: ID::from_str(&remote.id)?,
            title: remote.summary,
            description: remote.description,
            start_ts: remote.start.date_time.timestamp_millis()?,
            end_ts: remote.end.date_time.timestamp_millis()?,
            timezone,
            status,
            location: remote.location,
        })
    }
}

/// Writable attributes of a remote event. The id travels in the path, the
/// status through the dedicated cancel endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEventAttributes {
    pub start: RemoteEventDateTime,
    pub end: RemoteEventDateTime,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
}

impl From<&CalendarEvent> for RemoteEventAttributes {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            start: RemoteEventDateTime::new(event.start_ts, &event.timezone),
            end: RemoteEventDateTime::new(event.end_ts, &event.timezone),
            summary: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEventsResponse {
    items: Vec<RemoteEvent>,
}

pub struct CalendarRestApi {
    client: Client,
    base_url: String,
    access_token: String,
}

impl CalendarRestApi {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_token,
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: String) -> anyhow::Result<T> {
        match self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
        {
            Ok(res) => res.json::<T>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Calendar API GET error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!("[Network Error] Calendar API GET error. Error message: {:?}", e);
                Err(anyhow::Error::new(e))
            }
        }
    }

    async fn put<T: for<'de> Deserialize<'de>>(
        &self,
        body: &impl Serialize,
        path: String,
    ) -> anyhow::Result<T> {
        match self
            .client
            .put(format!("{}/{}", self.base_url, path))
            .header("authorization", format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await
        {
            Ok(res) => res.json::<T>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Calendar API PUT error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!("[Network Error] Calendar API PUT error. Error message: {:?}", e);
                Err(anyhow::Error::new(e))
            }
        }
    }

    async fn post_empty(&self, path: String) -> anyhow::Result<()> {
        match self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header("authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
        {
            Ok(res) => res.error_for_status().map(|_| ()).map_err(|e| {
                error!(
                    "[Unexpected Response] Calendar API POST error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!("[Network Error] Calendar API POST error. Error message: {:?}", e);
                Err(anyhow::Error::new(e))
            }
        }
    }
}

#[async_trait::async_trait]
impl ICalendarApi for CalendarRestApi {
    async fn list_events(&self, range: &TimeInterval) -> anyhow::Result<Vec<CalendarEvent>> {
        let time_min = RemoteDateTime::from_timestamp_millis(range.start_ts());
        let time_max = RemoteDateTime::from_timestamp_millis(range.end_ts());
        let res: ListEventsResponse = self
            .get(format!(
                "events?timeMin={}&timeMax={}&singleEvents=true",
                time_min.0, time_max.0
            ))
            .await?;

        // Events the provider returns in a shape we cannot read are skipped
        // rather than failing the whole availability computation.
        Ok(res
            .items
            .into_iter()
            .filter_map(|remote| match CalendarEvent::try_from(remote) {
                Ok(event) => Some(event),
                Err(e) => {
                    error!("Skipping unreadable remote event: {:?}", e);
                    None
                }
            })
            .collect())
    }

    async fn get_event(&self, event_id: &ID) -> anyhow::Result<Option<CalendarEvent>> {
        let res = match self
            .client
            .get(format!("{}/events/{}", self.base_url, event_id))
            .header("authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!("[Network Error] Calendar API GET error. Error message: {:?}", e);
                return Err(anyhow::Error::new(e));
            }
        };

        // Only a provider 404 means the event does not exist. Outages and
        // auth failures must surface as errors, not as a missing event.
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = res.error_for_status().map_err(|e| {
            error!(
                "[Unexpected Response] Calendar API GET error. Error message: {:?}",
                e
            );
            anyhow::Error::new(e)
        })?;
        let remote: RemoteEvent = res.json().await.map_err(|e| {
            error!(
                "[Unexpected Response] Calendar API GET error. Error message: {:?}",
                e
            );
            anyhow::Error::new(e)
        })?;
        Ok(Some(remote.try_into()?))
    }

    async fn update_event(&self, event: &CalendarEvent) -> anyhow::Result<CalendarEvent> {
        let attributes = RemoteEventAttributes::from(event);
        let updated: RemoteEvent = self
            .put(&attributes, format!("events/{}", event.id))
            .await?;
        updated.try_into()
    }

    async fn cancel_event(&self, event_id: &ID) -> anyhow::Result<()> {
        self.post_empty(format!("events/{}/cancel", event_id)).await
    }
}
