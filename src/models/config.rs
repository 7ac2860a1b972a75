//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing page and parsing rules
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Cycle timing and diff behavior
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Notification fan-out settings
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        if self.source.table_id.trim().is_empty() {
            return Err(AppError::validation("source.table_id is empty"));
        }
        if self.source.active_token.is_empty() {
            return Err(AppError::validation("source.active_token is empty"));
        }
        if self.source.offset().is_none() {
            return Err(AppError::validation(
                "source.utc_offset_minutes must be within ±24h",
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(AppError::validation("scheduler.interval_secs must be > 0"));
        }
        if self.delivery.max_concurrent == 0 {
            return Err(AppError::validation("delivery.max_concurrent must be > 0"));
        }
        if self.delivery.timeout_secs == 0 {
            return Err(AppError::validation("delivery.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Listing page location and table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing page URL, also the base for relative document links
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// `id` attribute of the publications table
    #[serde(default = "defaults::table_id")]
    pub table_id: String,

    /// Substring of the status column that marks a publication as active
    #[serde(default = "defaults::active_token")]
    pub active_token: String,

    /// Offset of the source's local time from UTC, in minutes
    #[serde(default = "defaults::utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl SourceConfig {
    /// Fixed offset used to interpret source dates.
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            table_id: defaults::table_id(),
            active_token: defaults::active_token(),
            utc_offset_minutes: defaults::utc_offset_minutes(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// How the previously seen active set is carried between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffPolicy {
    /// Replace the previous set only when a cycle found new ids.
    ///
    /// An id that disappears and comes back without any other new id in
    /// between is not announced again.
    #[default]
    ReplaceOnNew,
    /// Replace the previous set after every successful cycle.
    EveryCycle,
}

/// Cycle scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Run one cycle immediately at startup
    #[serde(default = "defaults::run_on_start")]
    pub run_on_start: bool,

    #[serde(default)]
    pub diff_policy: DiffPolicy,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            run_on_start: defaults::run_on_start(),
            diff_policy: DiffPolicy::default(),
        }
    }
}

/// Notification fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Maximum sends in flight at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Deadline for a single send in seconds
    #[serde(default = "defaults::delivery_timeout")]
    pub timeout_secs: u64,

    /// Telegram Bot API base URL
    #[serde(default = "defaults::telegram_api_base")]
    pub telegram_api_base: String,
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            timeout_secs: defaults::delivery_timeout(),
            telegram_api_base: defaults::telegram_api_base(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn source_url() -> String {
        "https://sistemas.undc.edu.pe/bienesyservicios/".into()
    }
    pub fn table_id() -> String {
        "datatable_publicaciones".into()
    }
    pub fn active_token() -> String {
        "Vigente".into()
    }
    pub fn utc_offset_minutes() -> i32 {
        -5 * 60
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tender-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Scheduler defaults
    pub fn interval() -> u64 {
        5 * 60
    }
    pub fn run_on_start() -> bool {
        true
    }

    // Delivery defaults
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn delivery_timeout() -> u64 {
        15
    }
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }
}
