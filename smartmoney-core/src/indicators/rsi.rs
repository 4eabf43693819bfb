//! Relative Strength Index (RSI), simple-average variant.
//!
//! gain[t] = max(close[t] - close[t-1], 0), loss[t] = max(close[t-1] - close[t], 0)
//! avg_gain / avg_loss = SMA over `period` deltas
//! RSI = 100 - 100 / (1 + avg_gain / (avg_loss + EPSILON))
//! Lookback: period (the first delta exists at index 1).
//! A flat series has avg_gain == avg_loss == 0 and yields RSI 0, not a division fault.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::sma::sma_of_series;

/// Added to the average loss so an all-gain window does not divide by zero.
pub const LOSS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];

        for i in 1..n {
            let delta = bars[i].close - bars[i - 1].close;
            if delta.is_nan() {
                continue;
            }
            gains[i] = delta.max(0.0);
            losses[i] = (-delta).max(0.0);
        }

        let avg_gain = sma_of_series(&gains, self.period);
        let avg_loss = sma_of_series(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    100.0 - 100.0 / (1.0 + g / (l + LOSS_EPSILON))
                }
            })
            .collect()
    }
}
