//! Classification: the directional call for one symbol at one evaluation time.
//!
//! A classification is produced fresh on every scan and never mutated
//! afterwards. Only directional classifications (`Buy`/`Sell`) are candidates
//! for notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional call of the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
    None,
}

impl Direction {
    pub fn is_directional(self) -> bool {
        !matches!(self, Direction::None)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::None => "NONE",
        };
        f.pad(s)
    }
}

/// A triggered rule, listed in priority order on a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Reason {
    VolumeSpike,
    TrendUp { fast_span: usize, slow_span: usize },
    TrendDown { fast_span: usize, slow_span: usize },
    Momentum { value: f64 },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::VolumeSpike => f.write_str("Volume spike"),
            Reason::TrendUp {
                fast_span,
                slow_span,
            } => write!(f, "{fast_span}>{slow_span} EMA"),
            Reason::TrendDown {
                fast_span,
                slow_span,
            } => write!(f, "{fast_span}<{slow_span} EMA"),
            // Truncated like the displayed oscillator reading, e.g. "RSI 61".
            Reason::Momentum { value } => write!(f, "RSI {}", value.trunc() as i64),
        }
    }
}

/// Stop-loss / take-profit pair attached to a directional classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Output of the rule engine for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub symbol: String,
    pub direction: Direction,
    /// Close of the latest bar.
    pub price: f64,
    /// Present iff `direction` is `Buy` or `Sell`.
    pub levels: Option<RiskLevels>,
    pub reasons: Vec<Reason>,
    pub evaluated_at: DateTime<Utc>,
}

impl Classification {
    pub fn is_directional(&self) -> bool {
        self.direction.is_directional()
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.levels.map(|l| l.stop_loss)
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.levels.map(|l| l.take_profit)
    }

    /// Reasons joined for display: "Volume spike, 20>50 EMA, RSI 61".
    pub fn reason_summary(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
