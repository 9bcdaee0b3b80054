use chrono::{DateTime, NaiveDate, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::platform::{LeagueFilter, PlatformKind};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Override for the Sleeper API base URL (tests, proxies)
    #[serde(default)]
    pub sleeper_base_url: Option<String>,
    /// Override for the Fleaflicker API base URL
    #[serde(default)]
    pub fleaflicker_base_url: Option<String>,
    /// Directory for cached upstream data (player catalog)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Player catalog refresh interval; Sleeper recommends 24 hours
    #[serde(default = "default_player_refresh")]
    pub player_refresh_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            sleeper_base_url: None,
            fleaflicker_base_url: None,
            data_dir: default_data_dir(),
            player_refresh_secs: default_player_refresh(),
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_player_refresh() -> u64 {
    24 * 60 * 60
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Season the feeds report on
    pub season: u16,
    /// Delivery tick interval in seconds
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Watchdog interval in seconds; longer than the delivery tick so a
    /// stalled schedule is observed, not raced
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,
    /// Directory holding the ledgers and feed-enabled flags
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// First date of the delivery window (MM-DD-YYYY)
    #[serde(default)]
    pub window_start: Option<String>,
    /// Last date of the delivery window (MM-DD-YYYY)
    #[serde(default)]
    pub window_end: Option<String>,
}

fn default_tick_secs() -> u64 {
    600
}

fn default_watchdog_secs() -> u64 {
    900
}

fn default_state_dir() -> String {
    "./bot_data".to_string()
}

impl DeliveryConfig {
    /// Inclusive-exclusive delivery window; unset edges fall back to a range
    /// wide enough to mean "everything".
    pub fn date_window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        let start = parse_window_date(self.window_start.as_deref().unwrap_or("12-31-1999"))?;
        let end = parse_window_date(self.window_end.as_deref().unwrap_or("12-31-2099"))?;
        Ok((start, end))
    }
}

fn parse_window_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw, "%m-%d-%Y")
        .map_err(|e| format!("bad window date '{}': {}", raw, e))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("bad window date '{}'", raw))?;
    Ok(midnight.and_utc())
}

/// One trade feed: an account on one platform, a league filter, and a
/// destination webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub platform: PlatformKind,
    /// Account identifier the leagues hang off of (Sleeper username/id,
    /// Fleaflicker email)
    pub account: String,
    /// Regular expression the league name must match
    #[serde(default)]
    pub league_filter: Option<String>,
    /// Case-insensitive substring the league name must contain
    #[serde(default)]
    pub league_substring: String,
    pub webhook_url: String,
    /// Ask the notifier to attach vote reactions to each delivered trade
    #[serde(default = "default_reactions")]
    pub reactions: bool,
}

fn default_reactions() -> bool {
    true
}

impl FeedConfig {
    pub fn compiled_league_filter(&self) -> crate::error::Result<LeagueFilter> {
        LeagueFilter::new(
            self.league_substring.clone(),
            self.league_filter.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("delivery.tick_secs", 600)?
            .set_default("delivery.watchdog_secs", 900)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g. config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("HUDDLE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (HUDDLE_DELIVERY__SEASON, etc.)
            .add_source(
                Environment::with_prefix("HUDDLE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values; failures here are fatal at startup.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.delivery.season == 0 {
            errors.push("delivery.season must be set".to_string());
        }
        if self.delivery.tick_secs == 0 {
            errors.push("delivery.tick_secs must be positive".to_string());
        }
        if self.delivery.watchdog_secs == 0 {
            errors.push("delivery.watchdog_secs must be positive".to_string());
        }
        if let Err(e) = self.delivery.date_window() {
            errors.push(e);
        }

        let mut seen_names = std::collections::HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                errors.push("feed with empty name".to_string());
                continue;
            }
            if !seen_names.insert(feed.name.as_str()) {
                errors.push(format!("duplicate feed name '{}'", feed.name));
            }
            if feed.account.trim().is_empty() {
                errors.push(format!("feed '{}' has no account", feed.name));
            }
            if feed.webhook_url.trim().is_empty() {
                errors.push(format!("feed '{}' has no webhook url", feed.name));
            }
            if let Err(e) = feed.compiled_league_filter() {
                errors.push(format!("feed '{}': {}", feed.name, e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
