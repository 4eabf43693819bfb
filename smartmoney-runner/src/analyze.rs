//! Per-symbol analysis: bars in, classified row out.
//!
//! Pure over its inputs. Alert state never enters here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use smartmoney_core::components::{
    compute_indicators, IndicatorParams, RiskCalculator, SignalInputs, SignalRules, VolumeRule,
};
use smartmoney_core::data::DataError;
use smartmoney_core::domain::{Bar, Classification};
use smartmoney_core::AnalysisError;

use crate::config::ScanConfig;

/// Why a symbol produced no row in a scan.
#[derive(Debug, Clone, Error)]
pub enum SkipReason {
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(#[from] DataError),

    #[error("invalid price {0}")]
    InvalidPrice(f64),
}

impl From<AnalysisError> for SkipReason {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InsufficientData {
                required,
                available,
            } => SkipReason::InsufficientData {
                required,
                available,
            },
            AnalysisError::InvalidPrice(p) => SkipReason::InvalidPrice(p),
        }
    }
}

/// One analysed symbol: its classification plus the volume figures used for
/// ranking and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRow {
    pub classification: Classification,
    pub volume: u64,
    /// Trailing volume baseline; `None` when the series has a single bar.
    pub avg_volume: Option<f64>,
}

/// Everything the analysis step needs, built once per scan.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer {
    pub min_bars: usize,
    pub indicators: IndicatorParams,
    pub volume: VolumeRule,
    pub rules: SignalRules,
    pub risk: RiskCalculator,
}

impl Analyzer {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            min_bars: config.scan.min_bars,
            indicators: config.indicator_params(),
            volume: config.volume_rule(),
            rules: config.signal_rules(),
            risk: config.risk_calculator(),
        }
    }

    /// Classify `symbol` from its (normalized, ascending) bars.
    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[Bar],
        evaluated_at: DateTime<Utc>,
    ) -> Result<ScanRow, AnalysisError> {
        if bars.len() < self.min_bars {
            return Err(AnalysisError::InsufficientData {
                required: self.min_bars,
                available: bars.len(),
            });
        }

        let series = compute_indicators(bars, &self.indicators)?;
        let latest = series.latest();
        if latest.all_undefined() {
            tracing::debug!(symbol, bars = bars.len(), "no indicator defined at the latest bar");
            return Err(AnalysisError::InsufficientData {
                required: self.min_bars,
                available: bars.len(),
            });
        }
        // Both averages are needed to classify; a defined oscillator alone is not enough.
        let (Some(fast), Some(slow)) = (latest.fast, latest.slow) else {
            return Err(AnalysisError::InsufficientData {
                required: self.min_bars,
                available: bars.len(),
            });
        };

        let Some(reading) = self.volume.read(bars) else {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                available: 0,
            });
        };

        let last = &bars[bars.len() - 1];
        let inputs = SignalInputs {
            price: last.close,
            fast,
            slow,
            momentum: latest.momentum,
            spike: self.volume.is_spike(reading.today, reading.baseline),
        };

        let mut classification = self.rules.classify(symbol, &inputs, evaluated_at);
        classification.levels = self.risk.levels(classification.direction, last.close)?;

        Ok(ScanRow {
            classification,
            volume: reading.today,
            avg_volume: reading.baseline,
        })
    }
}
