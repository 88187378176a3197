//! Lens Watch - polls a product search endpoint until a wanted lens is in stock
//!
//! Each attempt fetches the current listing, picks the first record that
//! satisfies the configured criteria and, on a hit, sends a single email
//! alert before stopping.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::config::{Settings, SettingsError};
pub use crate::core::{Matcher, PollError, PollOutcome, Poller};
pub use models::{CandidateRecord, MatchCriteria, SearchResponse};
pub use services::{FetchError, ListingSource, NotificationError, Notifier, SearchClient, SendGridClient};
