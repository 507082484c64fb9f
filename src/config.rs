//! Configuration management for Pair Sentinel
//!
//! Loads configuration from YAML files and environment variables.
//! Environment variables override YAML values. Policy thresholds have no
//! defaults: a missing or invalid threshold stops the process at startup.

use crate::constants::{endpoints, DEFAULT_CHAIN, DEFAULT_FETCH_TIMEOUT_MS};
use crate::policy::{Policy, PolicyField};
use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Risk thresholds
    pub security: SecurityConfig,
    /// Market filters
    pub filters: FiltersConfig,
    /// Trading parameters
    pub trading: TradingConfig,
    /// External data sources
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Telegram bot and alerts
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Watchlist monitor
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Health / metrics server
    #[serde(default)]
    pub server: ServerConfig,
    /// Path of the blacklist file
    #[serde(default = "default_blacklist_path")]
    pub blacklist_path: PathBuf,
}

fn default_blacklist_path() -> PathBuf {
    PathBuf::from("config/blacklist.yaml")
}

/// Risk-score thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub max_risk_score: f64,
    pub min_liquidity_lock: f64,
    pub min_distribution_score: f64,
}

/// Market thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    /// Minimum pool liquidity in USD
    pub min_liquidity: f64,
    /// Maximum 24h volume / liquidity
    pub max_volume_ratio: f64,
    /// Buys must exceed sells times this
    pub buy_sell_ratio: f64,
}

/// Trading parameters
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Stop loss percentage (negative)
    pub stop_loss: f64,
    /// Take profit percentage
    pub take_profit: f64,
    /// Monitor polling interval in seconds
    pub polling_interval: u64,
}

/// External data source endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_risk_source")]
    pub risk: SourceConfig,
    #[serde(default = "default_market_source")]
    pub market: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            risk: default_risk_source(),
            market: default_market_source(),
        }
    }
}

/// One HTTP data source
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_ms: u64,
    /// Chain segment for pair URLs (market source only)
    #[serde(default = "default_chain")]
    pub chain: String,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_risk_source() -> SourceConfig {
    SourceConfig {
        base_url: endpoints::RUGCHECK_API.to_string(),
        timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        chain: default_chain(),
    }
}

fn default_market_source() -> SourceConfig {
    SourceConfig {
        base_url: endpoints::DEXSCREENER_API.to_string(),
        timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        chain: default_chain(),
    }
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

fn default_chain() -> String {
    DEFAULT_CHAIN.to_string()
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Whether the bot and alerts are enabled
    #[serde(default)]
    pub enabled: bool,
    /// Bot token (from environment: SENTINEL_TELEGRAM__BOT_TOKEN)
    #[serde(default = "default_bot_token")]
    pub bot_token: SecretString,
    /// Only this chat may issue commands and receive alerts
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Bot API base URL
    #[serde(default = "default_telegram_api")]
    pub api_url: String,
    /// Long-poll timeout for getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Rate limit in seconds between similar alerts
    #[serde(default = "default_notification_rate_limit")]
    pub rate_limit_seconds: u64,
}

fn default_bot_token() -> SecretString {
    SecretString::new(String::new())
}

fn default_telegram_api() -> String {
    endpoints::TELEGRAM_API.to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_notification_rate_limit() -> u64 {
    60 // 1 minute
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: default_bot_token(),
            chat_id: None,
            api_url: default_telegram_api(),
            poll_timeout_secs: default_poll_timeout(),
            rate_limit_seconds: default_notification_rate_limit(),
        }
    }
}

/// Watchlist monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Enable the periodic re-evaluation loop
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Upper bound for one address evaluation (ms)
    #[serde(default = "default_evaluation_timeout")]
    pub evaluation_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_evaluation_timeout() -> u64 {
    15_000
}

impl MonitoringConfig {
    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluation_timeout_ms)
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            evaluation_timeout_ms: default_evaluation_timeout(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Blacklist file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlacklistConfig {
    /// Denylisted token / pair addresses
    pub tokens: Vec<String>,
    /// Denylisted developer identities
    pub developers: Vec<String>,
    /// Denylisted behavioural pattern signatures
    pub malicious_patterns: Vec<String>,
}

impl BlacklistConfig {
    /// Load the blacklist file; every key is required
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SENTINEL_*)
    /// 2. config/config.yaml (if exists)
    /// 3. config.yaml (if exists)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/config").required(false))
            // SENTINEL_TELEGRAM__BOT_TOKEN=... -> telegram.bot_token
            // SENTINEL_TRADING__POLLING_INTERVAL=30 -> trading.polling_interval
            .add_source(
                Environment::with_prefix("SENTINEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a single file, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }

    /// Initial policy assembled from the threshold sections
    pub fn policy(&self) -> Policy {
        Policy {
            max_risk_score: self.security.max_risk_score,
            min_liquidity_lock: self.security.min_liquidity_lock,
            min_distribution_score: self.security.min_distribution_score,
            min_liquidity: self.filters.min_liquidity,
            max_volume_ratio: self.filters.max_volume_ratio,
            buy_sell_ratio: self.filters.buy_sell_ratio,
            stop_loss: self.trading.stop_loss,
            take_profit: self.trading.take_profit,
            polling_interval: self.trading.polling_interval,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let policy = self.policy();
        for field in PolicyField::ALL {
            field
                .validate(policy.get(field))
                .map_err(|e| ConfigError::Message(e.to_string()))?;
        }

        for (name, source) in [("risk", &self.sources.risk), ("market", &self.sources.market)] {
            if source.base_url.is_empty() {
                return Err(ConfigError::Message(format!(
                    "sources.{}.base_url must be set",
                    name
                )));
            }
            if source.timeout_ms == 0 {
                return Err(ConfigError::Message(format!(
                    "sources.{}.timeout_ms must be greater than 0",
                    name
                )));
            }
        }

        if self.monitoring.evaluation_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "monitoring.evaluation_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.telegram.enabled && self.telegram.bot_token.expose_secret().is_empty() {
            return Err(ConfigError::Message(
                "Telegram bot token must be set via SENTINEL_TELEGRAM__BOT_TOKEN".to_string(),
            ));
        }

        Ok(())
    }
}
