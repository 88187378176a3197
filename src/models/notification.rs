use serde::{Deserialize, Serialize};

pub const AVAILABLE_SUBJECT: &str = "The item is available";
pub const AVAILABLE_TEXT: &str = "The item you wanted is back online and available!";

/// Email identity used for both sender and recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

impl Mailbox {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Availability alert sent once a listing matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub plain_text: String,
    pub html: String,
}

impl Notification {
    /// Build the "back in stock" message linking to `item_url`
    pub fn item_available(from: Mailbox, to: Mailbox, item_url: &str) -> Self {
        Self {
            from,
            to,
            subject: AVAILABLE_SUBJECT.to_string(),
            plain_text: AVAILABLE_TEXT.to_string(),
            html: format!(
                "<strong>{} follow: <a href=\"{}\">This link</a></strong>",
                AVAILABLE_TEXT, item_url
            ),
        }
    }
}

/// Whether the alert for a match reached the notification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
}

impl DeliveryStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }
}
