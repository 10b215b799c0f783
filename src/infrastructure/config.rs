//! Configuration management
//!
//! Loads configuration from config.toml at startup.
//! All values are configurable to avoid hardcoded constants.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relay configuration
///
/// Loaded from config.toml at startup. Contains all tunable parameters
/// to avoid hardcoded values throughout the codebase.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Polling and broadcast settings
    #[serde(default)]
    pub relay: RelayConfig,

    /// Trading-hours window
    #[serde(default)]
    pub market: MarketConfig,

    /// Upstream collaborator endpoints
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// API server settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Polling cadence and fan-out settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Poll interval while the market is open, in seconds
    #[serde(default = "default_open_interval")]
    pub open_interval_secs: u64,

    /// Poll interval while the market is closed, in seconds
    #[serde(default = "default_closed_interval")]
    pub closed_interval_secs: u64,

    /// Per-symbol quote fetch timeout, in milliseconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// How long the active-symbol set stays fresh, in seconds
    #[serde(default = "default_symbol_refresh")]
    pub symbol_refresh_secs: u64,

    /// Upper bound on outstanding quote fetches per cycle
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,

    /// Per-subscriber frame buffer; a subscriber that falls this many
    /// frames behind is dropped
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

/// Market open/close window in a fixed reference offset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// Opening time, "HH:MM"
    #[serde(default = "default_market_open")]
    pub open: String,

    /// Closing time, "HH:MM"
    #[serde(default = "default_market_close")]
    pub close: String,

    /// Whole-hour UTC offset of the trading calendar
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i8,
}

/// Upstream collaborator endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Contest service URL returning the active-symbol list
    #[serde(default = "default_contest_url")]
    pub contest_url: String,

    /// Quote source base URL (expects /quote/{symbol} and
    /// /validate/{symbol} below it)
    #[serde(default = "default_quote_url")]
    pub quote_url: String,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Port for the HTTP/WebSocket server
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl RelayConfig {
    pub fn open_interval(&self) -> Duration {
        Duration::from_secs(self.open_interval_secs)
    }

    pub fn closed_interval(&self) -> Duration {
        Duration::from_secs(self.closed_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn symbol_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.symbol_refresh_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            open_interval_secs: default_open_interval(),
            closed_interval_secs: default_closed_interval(),
            fetch_timeout_ms: default_fetch_timeout(),
            symbol_refresh_secs: default_symbol_refresh(),
            max_concurrent_fetches: default_max_concurrent(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            open: default_market_open(),
            close: default_market_close(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            contest_url: default_contest_url(),
            quote_url: default_quote_url(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
        }
    }
}

fn default_open_interval() -> u64 {
    5
}

fn default_closed_interval() -> u64 {
    60
}

fn default_fetch_timeout() -> u64 {
    3000
}

fn default_symbol_refresh() -> u64 {
    300 // 5 minutes
}

fn default_max_concurrent() -> usize {
    8
}

fn default_subscriber_buffer() -> usize {
    32
}

fn default_market_open() -> String {
    "09:30".to_string()
}

fn default_market_close() -> String {
    "16:00".to_string()
}

fn default_utc_offset() -> i8 {
    -5 // US Eastern, standard time
}

fn default_contest_url() -> String {
    "http://localhost:8081/api/contest/symbols".to_string()
}

fn default_quote_url() -> String {
    "http://localhost:8082/api/market-data".to_string()
}

fn default_api_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from config.toml file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(e.to_string()))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File not found - use defaults
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::IoError(e)),
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading file
    IoError(std::io::Error),
    /// Parse error (invalid TOML)
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::ParseError(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(_) => None,
        }
    }
}
