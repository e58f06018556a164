// src/services/notification.rs

//! Fire-and-forget event publishing to the notification service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::enums::{PurchaseStatus, ShippingStatus};

pub const NOTIFICATION_SOURCE: &str = "car-service";
const NOTIFICATIONS_PATH: &str = "/api/v1/notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Normal,
    High,
    Urgent,
}

impl NotificationPriority {
    pub fn for_shipping(status: ShippingStatus) -> Self {
        match status {
            ShippingStatus::Delivered => NotificationPriority::Urgent,
            ShippingStatus::Shipped | ShippingStatus::Arrived | ShippingStatus::Cleared => {
                NotificationPriority::High
            }
            ShippingStatus::Processing => NotificationPriority::Normal,
        }
    }

    pub fn for_purchase(status: PurchaseStatus) -> Self {
        match status {
            PurchaseStatus::PaymentCompleted | PurchaseStatus::Cancelled | PurchaseStatus::Rejected => {
                NotificationPriority::Urgent
            }
            PurchaseStatus::Confirmed | PurchaseStatus::LcIssued => NotificationPriority::High,
            PurchaseStatus::Pending | PurchaseStatus::LcPending | PurchaseStatus::PaymentPending => {
                NotificationPriority::Normal
            }
        }
    }
}

pub fn vehicle_ref(id: i64) -> String {
    format!("VEH-{}", id)
}

pub fn customer_ref(id: i64) -> String {
    format!("CUST-{}", id)
}

pub fn supplier_ref(id: i64) -> String {
    format!("SUP-{}", id)
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationMetadata {
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub notification_type: String,
    pub source: String,
    pub payload: Value,
    pub priority: NotificationPriority,
    pub reference_id: String,
    pub metadata: NotificationMetadata,
}

impl Notification {
    pub fn new(
        notification_type: &str,
        reference_id: String,
        payload: Value,
        user_id: Option<&str>,
    ) -> Self {
        Self {
            notification_type: notification_type.to_string(),
            source: NOTIFICATION_SOURCE.to_string(),
            payload,
            priority: NotificationPriority::Normal,
            reference_id,
            metadata: NotificationMetadata {
                user_id: user_id.map(str::to_string),
                timestamp: Utc::now(),
            },
        }
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl NotificationService {
    /// `base_url` of `None` disables dispatch entirely.
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        let endpoint = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .map(|url| format!("{}{}", url, NOTIFICATIONS_PATH));
        Self { client, endpoint }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Posts the envelope and waits for the answer.
    pub async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(());
        };

        let response = self.client.post(endpoint).json(notification).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("notification service answered {}", status);
        }
        Ok(())
    }

    /// Publishes on a detached task; failures are logged and dropped.
    pub fn dispatch(&self, notification: Notification) {
        if !self.is_enabled() {
            return;
        }

        let service = self.clone();
        tokio::spawn(async move {
            match service.send(&notification).await {
                Ok(()) => tracing::debug!(
                    notification_type = %notification.notification_type,
                    reference_id = %notification.reference_id,
                    "notification delivered"
                ),
                Err(e) => tracing::warn!(
                    notification_type = %notification.notification_type,
                    reference_id = %notification.reference_id,
                    error = %e,
                    "failed to deliver notification"
                ),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn shipping_priorities() {
        assert_eq!(NotificationPriority::for_shipping(ShippingStatus::Delivered), NotificationPriority::Urgent);
        assert_eq!(NotificationPriority::for_shipping(ShippingStatus::Shipped), NotificationPriority::High);
        assert_eq!(NotificationPriority::for_shipping(ShippingStatus::Cleared), NotificationPriority::High);
        assert_eq!(NotificationPriority::for_shipping(ShippingStatus::Processing), NotificationPriority::Normal);
    }

    #[test]
    fn purchase_priorities() {
        assert_eq!(NotificationPriority::for_purchase(PurchaseStatus::LcIssued), NotificationPriority::High);
        assert_eq!(NotificationPriority::for_purchase(PurchaseStatus::Confirmed), NotificationPriority::High);
        assert_eq!(NotificationPriority::for_purchase(PurchaseStatus::PaymentCompleted), NotificationPriority::Urgent);
        assert_eq!(NotificationPriority::for_purchase(PurchaseStatus::Rejected), NotificationPriority::Urgent);
        assert_eq!(NotificationPriority::for_purchase(PurchaseStatus::LcPending), NotificationPriority::Normal);
    }

    #[test]
    fn envelope_serialises_with_lowercase_priority() {
        let n = Notification::new("vehicle_deleted", vehicle_ref(7), json!({"vehicle_id": 7}), Some("u-1"))
            .with_priority(NotificationPriority::High);
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["source"], "car-service");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["reference_id"], "VEH-7");
        assert_eq!(value["metadata"]["user_id"], "u-1");
    }

    #[tokio::test]
    async fn send_posts_envelope_to_notifications_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/notifications")
            .match_body(Matcher::PartialJson(json!({
                "notification_type": "shipping_status_changed",
                "priority": "urgent",
                "reference_id": "VEH-3",
            })))
            .with_status(201)
            .create_async()
            .await;

        let service = NotificationService::new(reqwest::Client::new(), Some(format!("{}/", server.url())));
        let n = Notification::new("shipping_status_changed", vehicle_ref(3), json!({}), None)
            .with_priority(NotificationPriority::for_shipping(ShippingStatus::Delivered));

        service.send(&n).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/notifications")
            .with_status(503)
            .create_async()
            .await;

        let service = NotificationService::new(reqwest::Client::new(), Some(server.url()));
        let n = Notification::new("vehicle_created", vehicle_ref(1), json!({}), None);
        assert!(service.send(&n).await.is_err());
    }

    #[tokio::test]
    async fn missing_endpoint_skips_dispatch() {
        let service = NotificationService::new(reqwest::Client::new(), None);
        assert!(!service.is_enabled());
        let n = Notification::new("vehicle_created", vehicle_ref(1), json!({}), None);
        assert!(service.send(&n).await.is_ok());
    }
}
