// =============================================================================
// Application Configuration — JSON file with per-field defaults
// =============================================================================
//
// Every field carries `#[serde(default)]` so that adding new fields never
// breaks loading an older config file. A missing or unreadable file falls
// back to `Default` at the call site; nothing mutates config at runtime.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_period() -> String {
    "1y".to_string()
}

fn default_ma_periods() -> Vec<usize> {
    vec![20, 50, 200]
}

fn default_ema_spans() -> Vec<usize> {
    vec![12, 26]
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_std() -> f64 {
    2.0
}

fn default_stochastic_k() -> usize {
    14
}

fn default_stochastic_d() -> usize {
    3
}

fn default_volume_ma_period() -> usize {
    20
}

fn default_level_window() -> usize {
    20
}

fn default_channel_period() -> usize {
    20
}

fn default_signal_ma_period() -> usize {
    20
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Window lengths for every served indicator. These are the conventional
/// textbook defaults; override them in the config file per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_ma_periods")]
    pub ma_periods: Vec<usize>,

    #[serde(default = "default_ema_spans")]
    pub ema_spans: Vec<usize>,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    #[serde(default = "default_bollinger_std")]
    pub bollinger_std: f64,

    #[serde(default = "default_stochastic_k")]
    pub stochastic_k: usize,

    #[serde(default = "default_stochastic_d")]
    pub stochastic_d: usize,

    #[serde(default = "default_volume_ma_period")]
    pub volume_ma_period: usize,

    #[serde(default = "default_level_window")]
    pub level_window: usize,

    #[serde(default = "default_channel_period")]
    pub channel_period: usize,

    #[serde(default = "default_signal_ma_period")]
    pub signal_ma_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        serde_json::from_str("{}").expect("empty object deserializes via field defaults")
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the REST API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the market-data provider.
    #[serde(default = "default_base_url")]
    pub provider_base_url: String,

    /// User-Agent sent to the provider (it rejects bare clients).
    #[serde(default = "default_user_agent")]
    pub provider_user_agent: String,

    /// Per-request timeout against the provider.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// History period used when a request does not specify one.
    #[serde(default = "default_period")]
    pub default_period: String,

    #[serde(default)]
    pub indicators: IndicatorParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        serde_json::from_str("{}").expect("empty object deserializes via field defaults")
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.default_period, "1y");
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.indicators.ma_periods, vec![20, 50, 200]);
        assert_eq!(config.indicators.bollinger_std, 2.0);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let config: AppConfig =
            serde_json::from_str(r#"{"bind_addr": "127.0.0.1:9000", "indicators": {"rsi_period": 21}}"#)
                .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.indicators.rsi_period, 21);
        // Untouched fields come from the defaults.
        assert_eq!(config.indicators.macd_fast, 12);
        assert_eq!(config.default_period, "1y");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(AppConfig::load("/definitely/not/here.json").is_err());
    }
}
