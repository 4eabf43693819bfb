//! Indicator trait and the per-symbol indicator series.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! Undefined positions are `f64::NAN`; accessors on `IndicatorSeries`
//! turn them into `None`.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::AnalysisError;
use crate::indicators::{Ema, Rsi};

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading positions that are undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Spans and windows for the indicator engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub momentum_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_span: 20,
            slow_span: 50,
            momentum_window: 14,
        }
    }
}

/// Derived values aligned 1:1 with the source bars.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub fast: Vec<f64>,
    pub slow: Vec<f64>,
    pub momentum: Vec<f64>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fast.is_empty()
    }

    pub fn fast_at(&self, index: usize) -> Option<f64> {
        defined(self.fast.get(index).copied())
    }

    pub fn slow_at(&self, index: usize) -> Option<f64> {
        defined(self.slow.get(index).copied())
    }

    pub fn momentum_at(&self, index: usize) -> Option<f64> {
        defined(self.momentum.get(index).copied())
    }

    /// Values at the latest bar.
    pub fn latest(&self) -> LatestIndicators {
        let last = self.len().saturating_sub(1);
        LatestIndicators {
            fast: self.fast_at(last),
            slow: self.slow_at(last),
            momentum: self.momentum_at(last),
        }
    }
}

/// Snapshot of the indicator values at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestIndicators {
    pub fast: Option<f64>,
    pub slow: Option<f64>,
    pub momentum: Option<f64>,
}

impl LatestIndicators {
    pub fn all_undefined(&self) -> bool {
        self.fast.is_none() && self.slow.is_none() && self.momentum.is_none()
    }
}

fn defined(v: Option<f64>) -> Option<f64> {
    v.filter(|x| !x.is_nan())
}

/// Run the indicator engine over one symbol's bars.
pub fn compute_indicators(
    bars: &[Bar],
    params: &IndicatorParams,
) -> Result<IndicatorSeries, AnalysisError> {
    if bars.is_empty() {
        return Err(AnalysisError::InsufficientData {
            required: 1,
            available: 0,
        });
    }

    Ok(IndicatorSeries {
        fast: Ema::new(params.fast_span).compute(bars),
        slow: Ema::new(params.slow_span).compute(bars),
        momentum: Rsi::new(params.momentum_window).compute(bars),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn empty_bars_are_insufficient() {
        let err = compute_indicators(&[], &IndicatorParams::default()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                required: 1,
                available: 0
            }
        );
    }

    #[test]
    fn series_aligned_with_bars() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let series = compute_indicators(&bars, &IndicatorParams::default()).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.slow.len(), 5);
        assert_eq!(series.momentum.len(), 5);
    }

    #[test]
    fn short_history_has_no_momentum() {
        let closes: Vec<f64> = (0..13).map(|i| 100.0 + i as f64).collect();
        let series = compute_indicators(&make_bars(&closes), &IndicatorParams::default()).unwrap();
        let latest = series.latest();
        assert!(latest.momentum.is_none());
        assert!(latest.fast.is_some());
        assert!(latest.slow.is_some());
        assert!(!latest.all_undefined());
    }

    #[test]
    fn out_of_range_index_is_none() {
        let series =
            compute_indicators(&make_bars(&[1.0, 2.0]), &IndicatorParams::default()).unwrap();
        assert_eq!(series.fast_at(5), None);
    }
}
