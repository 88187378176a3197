use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::{Mailbox, Notification};
use crate::services::Notifier;

pub const DEFAULT_SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com";

/// Errors that can occur when delivering a notification
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SendGrid rejected the message ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

/// SendGrid v3 mail client
///
/// Sends the availability alert from the configured sender to the
/// configured recipient. Delivery is attempted once.
pub struct SendGridClient {
    base_url: String,
    api_key: String,
    from: Mailbox,
    to: Mailbox,
    client: Client,
}

impl SendGridClient {
    /// Create a new SendGrid client
    pub fn new(
        base_url: String,
        api_key: String,
        from: Mailbox,
        to: Mailbox,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            from,
            to,
            client,
        })
    }

    /// Send a single message through `/v3/mail/send`
    pub async fn send(&self, message: &Notification) -> Result<(), NotificationError> {
        let url = format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'));

        tracing::debug!("Sending notification to {} via {}", message.to.email, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&mail_payload(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(NotificationError::Rejected { status, body });
        }

        tracing::info!("Email sent. {}", status.as_u16());

        Ok(())
    }
}

#[async_trait]
impl Notifier for SendGridClient {
    async fn notify_available(&self, item_url: &str) -> Result<(), NotificationError> {
        tracing::info!("sending email: {}", item_url);

        let message = Notification::item_available(self.from.clone(), self.to.clone(), item_url);
        self.send(&message).await
    }
}

/// Build the SendGrid request body for a single-recipient message
fn mail_payload(message: &Notification) -> Value {
    json!({
        "personalizations": [{
            "to": [{ "email": message.to.email, "name": message.to.name }],
        }],
        "from": { "email": message.from.email, "name": message.from.name },
        "subject": message.subject,
        "content": [
            { "type": "text/plain", "value": message.plain_text },
            { "type": "text/html", "value": message.html },
        ],
    })
}
