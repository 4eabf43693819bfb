//! Scan configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid config.
//! `validate()` runs after every load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use smartmoney_core::alert::AlertDeduplicator;
use smartmoney_core::components::{IndicatorParams, RiskCalculator, SignalRules, VolumeRule};
use smartmoney_core::domain::{BarInterval, Lookback};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Allowed range for `scan.scan_count`.
pub const SCAN_COUNT_RANGE: std::ops::RangeInclusive<usize> = 50..=300;

/// Longest accepted cool-down: one year.
pub const MAX_COOL_DOWN_HOURS: i64 = 24 * 365;

/// Upper bound on provider retries; backoff doubles per attempt.
pub const MAX_PROVIDER_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSection,
    pub signal: SignalSection,
    pub risk: RiskSection,
    pub alerts: AlertSection,
    pub provider: ProviderSection,
    pub notify: NotifySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub scan_count: usize,
    pub symbols_file: PathBuf,
    pub lookback_days: u32,
    pub interval: BarInterval,
    pub min_bars: usize,
    pub throttle_ms: u64,
    pub top_n: usize,
    pub analysis_threads: usize,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            scan_count: 150,
            symbols_file: PathBuf::from("nifty200.csv"),
            lookback_days: 60,
            interval: BarInterval::OneDay,
            min_bars: 30,
            throttle_ms: 150,
            top_n: 10,
            analysis_threads: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSection {
    pub fast_span: usize,
    pub slow_span: usize,
    pub momentum_window: usize,
    pub bullish_threshold: f64,
    pub bearish_threshold: f64,
    pub volume_window: usize,
    pub volume_spike_multiplier: f64,
}

impl Default for SignalSection {
    fn default() -> Self {
        Self {
            fast_span: 20,
            slow_span: 50,
            momentum_window: 14,
            bullish_threshold: 55.0,
            bearish_threshold: 45.0,
            volume_window: 20,
            volume_spike_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            stop_loss_pct: 2.0,
            take_profit_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSection {
    pub cool_down_hours: i64,
    /// JSON file for alert state. `None` keeps state in memory only.
    pub state_file: Option<PathBuf>,
}

impl Default for AlertSection {
    fn default() -> Self {
        Self {
            cool_down_hours: 24,
            state_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
        }
    }
}

/// Where alert messages go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Telegram,
    Stdout,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    pub channel: ChannelKind,
    pub timeout_secs: u64,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            channel: ChannelKind::Telegram,
            timeout_secs: 8,
        }
    }
}

impl ScanConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scan;
        if !SCAN_COUNT_RANGE.contains(&s.scan_count) {
            return invalid(format!(
                "scan.scan_count must be within {}..={}, got {}",
                SCAN_COUNT_RANGE.start(),
                SCAN_COUNT_RANGE.end(),
                s.scan_count
            ));
        }
        if s.lookback_days == 0 {
            return invalid("scan.lookback_days must be >= 1");
        }
        if s.min_bars == 0 {
            return invalid("scan.min_bars must be >= 1");
        }
        if s.top_n == 0 {
            return invalid("scan.top_n must be >= 1");
        }
        if s.analysis_threads == 0 {
            return invalid("scan.analysis_threads must be >= 1");
        }

        let g = &self.signal;
        if g.fast_span == 0 || g.slow_span == 0 {
            return invalid("signal spans must be >= 1");
        }
        if g.fast_span >= g.slow_span {
            return invalid(format!(
                "signal.fast_span ({}) must be below signal.slow_span ({})",
                g.fast_span, g.slow_span
            ));
        }
        if g.momentum_window == 0 {
            return invalid("signal.momentum_window must be >= 1");
        }
        if !(0.0 < g.bearish_threshold
            && g.bearish_threshold < g.bullish_threshold
            && g.bullish_threshold < 100.0)
        {
            return invalid(format!(
                "momentum thresholds must satisfy 0 < bearish ({}) < bullish ({}) < 100",
                g.bearish_threshold, g.bullish_threshold
            ));
        }
        if g.volume_window == 0 {
            return invalid("signal.volume_window must be >= 1");
        }
        if !(g.volume_spike_multiplier > 0.0) {
            return invalid("signal.volume_spike_multiplier must be > 0");
        }

        let r = &self.risk;
        for (name, v) in [
            ("risk.stop_loss_pct", r.stop_loss_pct),
            ("risk.take_profit_pct", r.take_profit_pct),
        ] {
            if !(v > 0.0 && v < 100.0) {
                return invalid(format!("{name} must be within (0, 100), got {v}"));
            }
        }

        if !(1..=MAX_COOL_DOWN_HOURS).contains(&self.alerts.cool_down_hours) {
            return invalid(format!(
                "alerts.cool_down_hours must be within 1..={MAX_COOL_DOWN_HOURS}, got {}",
                self.alerts.cool_down_hours
            ));
        }
        if self.provider.max_retries > MAX_PROVIDER_RETRIES {
            return invalid(format!(
                "provider.max_retries must be <= {MAX_PROVIDER_RETRIES}, got {}",
                self.provider.max_retries
            ));
        }
        if self.provider.timeout_secs == 0 || self.notify.timeout_secs == 0 {
            return invalid("timeouts must be >= 1 second");
        }
        Ok(())
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            fast_span: self.signal.fast_span,
            slow_span: self.signal.slow_span,
            momentum_window: self.signal.momentum_window,
        }
    }

    pub fn volume_rule(&self) -> VolumeRule {
        VolumeRule {
            window: self.signal.volume_window,
            multiplier: self.signal.volume_spike_multiplier,
        }
    }

    pub fn signal_rules(&self) -> SignalRules {
        SignalRules {
            bullish_threshold: self.signal.bullish_threshold,
            bearish_threshold: self.signal.bearish_threshold,
            fast_span: self.signal.fast_span,
            slow_span: self.signal.slow_span,
        }
    }

    pub fn risk_calculator(&self) -> RiskCalculator {
        RiskCalculator::new(self.risk.stop_loss_pct, self.risk.take_profit_pct)
    }

    pub fn deduplicator(&self) -> AlertDeduplicator {
        AlertDeduplicator::new(chrono::Duration::hours(self.alerts.cool_down_hours))
    }

    pub fn lookback(&self) -> Lookback {
        Lookback::days(self.scan.lookback_days)
    }
}

fn invalid<T>(msg: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}
