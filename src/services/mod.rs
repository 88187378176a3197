// Service exports
pub mod search;
pub mod sendgrid;

use async_trait::async_trait;

use crate::models::SearchResponse;

pub use search::{decode_listing, FetchError, SearchClient};
pub use sendgrid::{NotificationError, SendGridClient};

/// Where the poll loop gets its listings from
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Perform exactly one fetch; retry policy belongs to the caller
    async fn fetch(&self) -> Result<SearchResponse, FetchError>;
}

/// Outbound alert channel used once a listing matches
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_available(&self, item_url: &str) -> Result<(), NotificationError>;
}
