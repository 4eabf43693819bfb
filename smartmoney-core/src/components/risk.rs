//! Fixed-percentage risk levels.
//!
//! For BUY: stop = price * (1 - sl%), target = price * (1 + tp%).
//! For SELL: stop = price * (1 + sl%), target = price * (1 - tp%).
//! Both rounded to 2 decimals.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, RiskLevels};
use crate::error::AnalysisError;

/// Stop-loss / take-profit calculator. Percentages are in percent units (2.0 = 2%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskCalculator {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskCalculator {
    fn default() -> Self {
        Self {
            stop_loss_pct: 2.0,
            take_profit_pct: 5.0,
        }
    }
}

impl RiskCalculator {
    pub fn new(stop_loss_pct: f64, take_profit_pct: f64) -> Self {
        assert!(
            stop_loss_pct > 0.0 && stop_loss_pct < 100.0,
            "stop_loss_pct must be in (0, 100)"
        );
        assert!(
            take_profit_pct > 0.0 && take_profit_pct < 100.0,
            "take_profit_pct must be in (0, 100)"
        );
        Self {
            stop_loss_pct,
            take_profit_pct,
        }
    }

    /// Levels for a directional call. `Ok(None)` for `Direction::None`.
    ///
    /// Fails with `InvalidPrice` for non-positive prices, and for prices so small
    /// that a rounded level would not sit strictly on the correct side of price.
    pub fn levels(
        &self,
        direction: Direction,
        price: f64,
    ) -> Result<Option<RiskLevels>, AnalysisError> {
        if !(price.is_finite() && price > 0.0) {
            return Err(AnalysisError::InvalidPrice(price));
        }

        let sl = self.stop_loss_pct / 100.0;
        let tp = self.take_profit_pct / 100.0;

        let levels = match direction {
            Direction::Buy => RiskLevels {
                stop_loss: round_cents(price * (1.0 - sl)),
                take_profit: round_cents(price * (1.0 + tp)),
            },
            Direction::Sell => RiskLevels {
                stop_loss: round_cents(price * (1.0 + sl)),
                take_profit: round_cents(price * (1.0 - tp)),
            },
            Direction::None => return Ok(None),
        };

        let ordered = match direction {
            Direction::Buy => levels.stop_loss < price && price < levels.take_profit,
            _ => levels.take_profit < price && price < levels.stop_loss,
        };
        if !ordered {
            return Err(AnalysisError::InvalidPrice(price));
        }

        Ok(Some(levels))
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
