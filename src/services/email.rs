// src/services/email.rs

use serde::Serialize;
use serde_json::Value;

const SEND_PATH: &str = "/api/v1/email/send";

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub data: Value,
}

#[derive(Clone)]
pub struct EmailService {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl EmailService {
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        let endpoint = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .map(|url| format!("{}{}", url, SEND_PATH));
        Self { client, endpoint }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(());
        };

        let response = self.client.post(endpoint).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("email service answered {}", status);
        }
        Ok(())
    }

    pub fn dispatch(&self, message: EmailMessage) {
        if !self.is_enabled() {
            return;
        }

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send(&message).await {
                tracing::warn!(template = %message.template, error = %e, "failed to send email");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn posts_message_to_send_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/email/send")
            .match_body(Matcher::Json(json!({
                "to": "buyer@example.com",
                "subject": "Your vehicle has shipped",
                "template": "shipping_status_update",
                "data": {"vehicle_id": 4, "status": "SHIPPED"},
            })))
            .with_status(200)
            .create_async()
            .await;

        let service = EmailService::new(reqwest::Client::new(), Some(server.url()));
        service
            .send(&EmailMessage {
                to: "buyer@example.com".into(),
                subject: "Your vehicle has shipped".into(),
                template: "shipping_status_update".into(),
                data: json!({"vehicle_id": 4, "status": "SHIPPED"}),
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn blank_base_url_disables_the_client() {
        let service = EmailService::new(reqwest::Client::new(), Some("  ".into()));
        assert!(!service.is_enabled());
    }
}
