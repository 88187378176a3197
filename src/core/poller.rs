use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

use crate::core::Matcher;
use crate::models::{CandidateRecord, DeliveryStatus};
use crate::services::{FetchError, ListingSource, Notifier};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Details of a successful run
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub record: CandidateRecord,
    pub attempts: u32,
    pub matched_at: DateTime<Utc>,
    pub delivery: DeliveryStatus,
}

/// Terminal, non-error outcome of the poll loop
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// A listing matched and the notifier was invoked
    Matched(MatchReport),
    /// The shutdown signal fired before anything matched
    Cancelled { attempts: u32 },
}

/// The poll loop gave up because a fetch failed
#[derive(Debug, Error)]
#[error("Polling aborted on attempt {attempts}: {source}")]
pub struct PollError {
    pub attempts: u32,
    #[source]
    pub source: FetchError,
}

/// Fetch, match, wait, repeat
///
/// Runs until a listing matches, a fetch fails, or the shutdown signal
/// fires. A fetch or decode failure is fatal on the first occurrence while
/// an empty or non-matching listing is retried indefinitely after a fixed
/// delay.
pub struct Poller<S, N> {
    source: S,
    notifier: N,
    matcher: Matcher,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl<S, N> Poller<S, N>
where
    S: ListingSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, matcher: Matcher, interval: Duration) -> Self {
        Self {
            source,
            notifier,
            matcher,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Use an externally owned shutdown signal
    ///
    /// Signal it with `notify_one` so a request made between awaits is not
    /// lost.
    pub fn with_shutdown(mut self, shutdown: Arc<Notify>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Drive the loop to a terminal state
    pub async fn run(&self) -> Result<PollOutcome, PollError> {
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            let fetched = tokio::select! {
                biased;
                _ = self.shutdown.notified() => {
                    tracing::info!("Polling cancelled during attempt {}", attempts);
                    return Ok(PollOutcome::Cancelled { attempts });
                }
                fetched = self.source.fetch() => fetched,
            };

            let listing = match fetched {
                Ok(listing) => listing,
                Err(source) => {
                    tracing::error!("Fetch failed on attempt {}: {}", attempts, source);
                    return Err(PollError { attempts, source });
                }
            };

            if let Some(record) = self.matcher.first_match(&listing).cloned() {
                log_match(&record);
                let report = self.deliver(record, attempts).await;
                return Ok(PollOutcome::Matched(report));
            }

            // Release this attempt's records before sleeping
            let scanned = listing.len();
            drop(listing);

            tracing::info!(
                "The item was not found this time ({} listings scanned), retrying in {}s",
                scanned,
                self.interval.as_secs()
            );

            tokio::select! {
                biased;
                _ = self.shutdown.notified() => {
                    tracing::info!("Polling cancelled after {} attempts", attempts);
                    return Ok(PollOutcome::Cancelled { attempts });
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    async fn deliver(&self, record: CandidateRecord, attempts: u32) -> MatchReport {
        let delivery = match self.notifier.notify_available(&record.url).await {
            Ok(()) => DeliveryStatus::Delivered,
            Err(e) => {
                tracing::warn!("Notification for {} was not delivered: {}", record.url, e);
                DeliveryStatus::Failed(e.to_string())
            }
        };

        MatchReport {
            record,
            attempts,
            matched_at: Utc::now(),
            delivery,
        }
    }
}

fn log_match(record: &CandidateRecord) {
    tracing::info!(
        manufacturer = %record.keh_manufacturer,
        coverage = %record.keh_coverage,
        max_aperture = %record.keh_max_aperture,
        in_stock = %record.in_stock,
        max_focal_length = %record.keh_max_focal_length,
        min_focal_length = %record.keh_min_focal_length,
        url = %record.url,
        mount = %record.keh_mount,
        sale_price = %record.sale_price,
        old_price = %record.old_price,
        "Item found!"
    );
}
