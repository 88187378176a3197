use lens_watch::core::{Matcher, PollOutcome, Poller};
use lens_watch::services::{SearchClient, SendGridClient};
use lens_watch::Settings;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "full".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    match log_format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.init(),
    }

    info!("Starting Lens Watch...");

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error loading config variables: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let search = match SearchClient::new(settings.search.url.clone(), settings.search_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create search client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let notifier = match SendGridClient::new(
        settings.notification.endpoint.clone(),
        settings.notification.api_key.clone(),
        settings.notification.sender(),
        settings.notification.receiver(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create SendGrid client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let matcher = Matcher::new(settings.criteria.clone());
    info!("Watching {} for {:?}", search.url(), matcher.criteria());

    let poller = Poller::new(search, notifier, matcher, settings.poll_interval());
    info!("Polling every {}s", poller.interval().as_secs());

    // Ctrl-C stops the loop between or during attempts
    let shutdown = poller.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown.notify_one();
        }
    });

    match poller.run().await {
        Ok(PollOutcome::Matched(report)) => {
            if !report.delivery.is_delivered() {
                warn!("Item found at {} but the email was not delivered", report.record.url);
            }
            info!(
                "Done after {} attempt(s), matched at {}",
                report.attempts,
                report.matched_at.to_rfc3339()
            );
            ExitCode::SUCCESS
        }
        Ok(PollOutcome::Cancelled { attempts }) => {
            info!("Stopped after {} attempt(s) without a match", attempts);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
