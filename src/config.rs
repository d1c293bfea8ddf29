//! Runtime configuration from environment variables

use std::env;

/// Where the backfill reads channel history from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryConfig {
    /// Platform REST API, channel located by name in `guild_id`
    Discord {
        api_base: String,
        token: String,
        guild_id: String,
    },
    /// JSON-lines export on disk
    File(String),
    /// No history source configured: backfill is skipped
    Disabled,
}

/// Configuration for the stats runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Designated channel name
    pub channel_name: String,

    pub history: HistoryConfig,

    /// Delay between backfill pages in milliseconds
    pub page_delay_ms: u64,

    /// Live event channel buffer size
    pub event_buffer: usize,

    pub rust_log: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RuntimeConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `WORDLE_CHANNEL` (default: wordle)
    /// - `DISCORD_TOKEN` + `DISCORD_GUILD_ID` (optional, REST backfill)
    /// - `DISCORD_API_BASE` (default: https://discord.com/api/v10)
    /// - `HISTORY_FILE` (optional, JSONL backfill when no token is set)
    /// - `BACKFILL_PAGE_DELAY_MS` (default: 1000)
    /// - `EVENT_CHANNEL_BUFFER` (default: 1000)
    /// - `RUST_LOG` (default: info)
    pub fn from_env() -> Result<Self, ConfigError> {
        let channel_name = non_empty_var("WORDLE_CHANNEL").unwrap_or_else(|| "wordle".to_string());

        let history = match (non_empty_var("DISCORD_TOKEN"), non_empty_var("DISCORD_GUILD_ID")) {
            (Some(token), Some(guild_id)) => HistoryConfig::Discord {
                api_base: non_empty_var("DISCORD_API_BASE")
                    .unwrap_or_else(|| crate::source::discord::DEFAULT_API_BASE.to_string()),
                token,
                guild_id,
            },
            (Some(_), None) => {
                return Err(ConfigError::MissingVariable("DISCORD_GUILD_ID".to_string()))
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingVariable("DISCORD_TOKEN".to_string()))
            }
            (None, None) => match non_empty_var("HISTORY_FILE") {
                Some(path) => HistoryConfig::File(path),
                None => HistoryConfig::Disabled,
            },
        };

        let page_delay_ms = parse_var("BACKFILL_PAGE_DELAY_MS", 1_000u64)?;

        let event_buffer = parse_var("EVENT_CHANNEL_BUFFER", 1_000usize)?;
        if event_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "EVENT_CHANNEL_BUFFER must be greater than 0".to_string(),
            ));
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            channel_name,
            history,
            page_delay_ms,
            event_buffer,
            rust_log,
        })
    }
}
