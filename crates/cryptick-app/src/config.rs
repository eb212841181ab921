//! Application configuration.

use crate::error::{AppError, AppResult};
use cryptick_core::Market;
use cryptick_ws::ConnectionConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feed endpoint URLs, one per market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Spot all-instrument ticker stream.
    #[serde(default = "default_spot_url")]
    pub spot_url: String,
    /// Derivative (perpetual futures) all-instrument ticker stream.
    #[serde(default = "default_derivative_url")]
    pub derivative_url: String,
}

fn default_spot_url() -> String {
    "wss://stream.binance.com:9443/ws/!ticker@arr".to_string()
}

fn default_derivative_url() -> String {
    "wss://fstream.binance.com/ws/!ticker@arr".to_string()
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            spot_url: default_spot_url(),
            derivative_url: default_derivative_url(),
        }
    }
}

/// WebSocket configuration subset, shared by both market connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Maximum consecutive reconnect attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts (ms).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Heartbeat ping interval (ms).
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Pong deadline after a ping (ms).
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

fn default_heartbeat_interval_ms() -> u64 {
    30000
}

fn default_heartbeat_timeout_ms() -> u64 {
    10000
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
        }
    }
}

impl From<WsConfig> for ConnectionConfig {
    fn from(cfg: WsConfig) -> Self {
        Self {
            url: String::new(), // Set separately
            market: Market::Spot,
            max_reconnect_attempts: cfg.max_reconnect_attempts,
            reconnect_delay_ms: cfg.reconnect_delay_ms,
            heartbeat_interval_ms: cfg.heartbeat_interval_ms,
            heartbeat_timeout_ms: cfg.heartbeat_timeout_ms,
        }
    }
}

/// Scrolling ticker display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Scroll tick interval (ms).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Viewport width in characters.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: usize,
    /// Symbols shown in the ticker at startup.
    #[serde(default = "default_display_symbols")]
    pub display_symbols: Vec<String>,
}

fn default_tick_interval_ms() -> u64 {
    1500
}

fn default_viewport_width() -> usize {
    80
}

fn default_display_symbols() -> Vec<String> {
    vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            viewport_width: default_viewport_width(),
            display_symbols: default_display_symbols(),
        }
    }
}

/// Alert evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Relative tolerance band around the target price.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
}

fn default_tolerance() -> Decimal {
    cryptick_alert::DEFAULT_TOLERANCE
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

/// Persistent store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON document holding favorites and alerts.
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "./data/cryptick.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub websocket: WsConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("CRYPTICK_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Build the connection configuration for one market.
    pub fn connection_config(&self, market: Market) -> ConnectionConfig {
        let mut cfg: ConnectionConfig = self.websocket.clone().into();
        cfg.market = market;
        cfg.url = match market {
            Market::Spot => self.feeds.spot_url.clone(),
            Market::Derivative => self.feeds.derivative_url.clone(),
        };
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.websocket.max_reconnect_attempts, 5);
        assert_eq!(config.websocket.reconnect_delay_ms, 5000);
        assert_eq!(config.websocket.heartbeat_interval_ms, 30000);
        assert_eq!(config.ticker.tick_interval_ms, 1500);
        assert_eq!(config.ticker.viewport_width, 80);
        assert_eq!(config.alerts.tolerance, dec!(0.001));
        assert!(config.feeds.spot_url.contains("!ticker@arr"));
        assert!(config.feeds.derivative_url.contains("!ticker@arr"));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [ticker]
            viewport_width = 60

            [alerts]
            tolerance = "0.01"
            "#,
        )
        .unwrap();

        assert_eq!(config.ticker.viewport_width, 60);
        assert_eq!(config.ticker.tick_interval_ms, 1500);
        assert_eq!(config.alerts.tolerance, dec!(0.01));
        assert_eq!(config.websocket.max_reconnect_attempts, 5);
    }

    #[test]
    fn test_connection_config_per_market() {
        let config = AppConfig::default();

        let spot = config.connection_config(Market::Spot);
        assert_eq!(spot.market, Market::Spot);
        assert_eq!(spot.url, config.feeds.spot_url);

        let deriv = config.connection_config(Market::Derivative);
        assert_eq!(deriv.market, Market::Derivative);
        assert_eq!(deriv.url, config.feeds.derivative_url);
        assert_eq!(deriv.max_reconnect_attempts, 5);
    }
}
