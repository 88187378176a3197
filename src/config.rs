use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

use crate::core::DEFAULT_POLL_INTERVAL;
use crate::models::{Mailbox, MatchCriteria};
use crate::services::search::DEFAULT_SEARCH_TIMEOUT;
use crate::services::sendgrid::DEFAULT_SENDGRID_ENDPOINT;

/// Plain environment variables accepted alongside the prefixed ones
const LEGACY_ENV_KEYS: [(&str, &str); 4] = [
    ("SEARCH_URL", "search.url"),
    ("SENDER_EMAIL", "notification.sender_email"),
    ("RECEIVER_EMAIL", "notification.receiver_email"),
    ("SENDGRID_API_KEY", "notification.api_key"),
];

/// Errors raised while building the startup configuration
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub search: SearchSettings,
    #[validate(nested)]
    #[serde(default)]
    pub poll: PollSettings,
    #[validate(nested)]
    #[serde(default)]
    pub criteria: MatchCriteria,
    #[validate(nested)]
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchSettings {
    #[validate(url)]
    pub url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PollSettings {
    #[validate(range(min = 1))]
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NotificationSettings {
    #[validate(url)]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[validate(length(min = 1))]
    pub api_key: String,
    #[validate(email)]
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[validate(email)]
    pub receiver_email: String,
    #[serde(default = "default_receiver_name")]
    pub receiver_name: String,
}

impl NotificationSettings {
    pub fn sender(&self) -> Mailbox {
        Mailbox::new(&self.sender_email, &self.sender_name)
    }

    pub fn receiver(&self) -> Mailbox {
        Mailbox::new(&self.receiver_email, &self.receiver_name)
    }
}

fn default_interval_secs() -> u64 { DEFAULT_POLL_INTERVAL.as_secs() }
fn default_endpoint() -> String { DEFAULT_SENDGRID_ENDPOINT.to_string() }
fn default_sender_name() -> String { "Lens Watch".to_string() }
fn default_receiver_name() -> String { "Lens Watch".to_string() }

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables prefixed with LENSWATCH
    ///    e.g., LENSWATCH__POLL__INTERVAL_SECS -> poll.interval_secs
    /// 4. SEARCH_URL, SENDER_EMAIL, RECEIVER_EMAIL, SENDGRID_API_KEY
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("LENSWATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_legacy_env(settings, |key| std::env::var(key).ok())?;

        Self::from_config(settings)
    }

    /// Parse configuration from an in-memory TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        Self::from_config(settings)
    }

    fn from_config(settings: Config) -> Result<Self, SettingsError> {
        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        self.search
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SEARCH_TIMEOUT)
    }
}

/// Override config values with the plain variables the tool has always read
fn apply_legacy_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in LEGACY_ENV_KEYS {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
