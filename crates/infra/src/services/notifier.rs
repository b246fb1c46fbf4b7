use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

/// Lifecycle notification pushed to the business owner's webhook. Delivery
/// is best effort; booking flows never fail because a notification did not
/// go out.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BookingNotification {
    #[serde(rename_all = "camelCase")]
    RequestConfirmed { event_id: String, title: String },
    #[serde(rename_all = "camelCase")]
    RequestDeclined { event_id: String, title: String },
    #[serde(rename_all = "camelCase")]
    AppointmentCancelled { event_id: String, title: String },
    #[serde(rename_all = "camelCase")]
    AppointmentEdited { event_id: String, title: String },
}

#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn notify(&self, notification: &BookingNotification);
}

pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }
}

#[async_trait::async_trait]
impl INotifier for WebhookNotifier {
    async fn notify(&self, notification: &BookingNotification) {
        if let Err(e) = self
            .client
            .post(&self.webhook_url)
            .json(notification)
            .send()
            .await
            .and_then(|res| res.error_for_status())
        {
            error!("Webhook notification delivery failed: {:?}", e);
        }
    }
}

/// Used when no webhook is configured.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl INotifier for NoopNotifier {
    async fn notify(&self, notification: &BookingNotification) {
        info!("Notification (no webhook configured): {:?}", notification);
    }
}
