//! Volume anomaly detection.
//!
//! The baseline is the mean volume of up to `window` bars immediately before
//! the latest bar; the latest bar never contributes to its own baseline.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Baseline window and spike multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeRule {
    pub window: usize,
    pub multiplier: f64,
}

impl Default for VolumeRule {
    fn default() -> Self {
        Self {
            window: 20,
            multiplier: 2.0,
        }
    }
}

/// Latest volume and its trailing baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeReading {
    pub today: u64,
    /// `None` when there is no prior bar.
    pub baseline: Option<f64>,
}

impl VolumeRule {
    /// Mean volume of the bars preceding the last one, over at most `window` bars.
    ///
    /// Uses however many prior bars exist when fewer than `window` do; `None`
    /// when there are none.
    pub fn baseline(&self, bars: &[Bar]) -> Option<f64> {
        let prior = bars.len().checked_sub(1)?;
        if prior == 0 || self.window == 0 {
            return None;
        }
        let start = prior.saturating_sub(self.window);
        let window = &bars[start..prior];
        let total: f64 = window.iter().map(|b| b.volume as f64).sum();
        Some(total / window.len() as f64)
    }

    /// Read the latest volume and its baseline. `None` for an empty series.
    pub fn read(&self, bars: &[Bar]) -> Option<VolumeReading> {
        let last = bars.last()?;
        Some(VolumeReading {
            today: last.volume,
            baseline: self.baseline(bars),
        })
    }

    /// spike = baseline defined AND baseline > 0 AND today > multiplier * baseline.
    pub fn is_spike(&self, today: u64, baseline: Option<f64>) -> bool {
        match baseline {
            Some(avg) if avg.is_finite() && avg > 0.0 => today as f64 > self.multiplier * avg,
            _ => false,
        }
    }
}
