//! Signal classification: combines trend, momentum and volume into a call.
//!
//! Rules are evaluated independently:
//! - trend_up = fast > slow, trend_down = fast < slow (equality is neither)
//! - momentum_high = oscillator > bullish, momentum_low = oscillator < bearish
//!   (strict; an undefined oscillator satisfies neither)
//! - BUY  iff trend_up   AND momentum_high AND spike
//! - SELL iff trend_down AND momentum_low  AND spike
//!
//! The classifier is portfolio- and state-agnostic: the same inputs always
//! produce the same classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Classification, Direction, Reason};

/// Momentum thresholds and the spans used to label trend reasons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRules {
    pub bullish_threshold: f64,
    pub bearish_threshold: f64,
    pub fast_span: usize,
    pub slow_span: usize,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            bullish_threshold: 55.0,
            bearish_threshold: 45.0,
            fast_span: 20,
            slow_span: 50,
        }
    }
}

/// Everything the classifier looks at for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    pub price: f64,
    pub fast: f64,
    pub slow: f64,
    pub momentum: Option<f64>,
    pub spike: bool,
}

/// Direction plus the rules that fired, before risk levels are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalVerdict {
    pub direction: Direction,
    pub reasons: Vec<Reason>,
}

impl SignalRules {
    /// Evaluate the rule set. Reasons are listed spike → trend → oscillator
    /// regardless of the resulting direction.
    pub fn evaluate(&self, inputs: &SignalInputs) -> SignalVerdict {
        let trend_up = inputs.fast > inputs.slow;
        let trend_down = inputs.fast < inputs.slow;
        let momentum_high = inputs
            .momentum
            .is_some_and(|m| m > self.bullish_threshold);
        let momentum_low = inputs
            .momentum
            .is_some_and(|m| m < self.bearish_threshold);

        let mut reasons = Vec::with_capacity(3);
        if inputs.spike {
            reasons.push(Reason::VolumeSpike);
        }
        if trend_up {
            reasons.push(Reason::TrendUp {
                fast_span: self.fast_span,
                slow_span: self.slow_span,
            });
        } else if trend_down {
            reasons.push(Reason::TrendDown {
                fast_span: self.fast_span,
                slow_span: self.slow_span,
            });
        }
        if let Some(value) = inputs.momentum.filter(|_| momentum_high || momentum_low) {
            reasons.push(Reason::Momentum { value });
        }

        let direction = if trend_up && momentum_high && inputs.spike {
            Direction::Buy
        } else if trend_down && momentum_low && inputs.spike {
            Direction::Sell
        } else {
            Direction::None
        };

        SignalVerdict { direction, reasons }
    }

    /// Evaluate and wrap into a `Classification` without risk levels.
    pub fn classify(
        &self,
        symbol: &str,
        inputs: &SignalInputs,
        evaluated_at: DateTime<Utc>,
    ) -> Classification {
        let verdict = self.evaluate(inputs);
        Classification {
            symbol: symbol.to_string(),
            direction: verdict.direction,
            price: inputs.price,
            levels: None,
            reasons: verdict.reasons,
            evaluated_at,
        }
    }
}
