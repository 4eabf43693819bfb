//! Synthetic history provider for offline runs and tests.
//!
//! Produces a random walk from a starting price of 100.0, seeded from the
//! symbol name so the same symbol always yields the same bars. Results built on
//! synthetic data are for wiring checks only.

use chrono::{DateTime, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, HistoryProvider};
use crate::domain::{Bar, BarInterval, Lookback};

/// Upper bound on generated bars per request.
const MAX_BARS: i64 = 5_000;

/// Deterministic random-walk provider.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Timestamp of the last generated bar.
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    /// Anchor at the start of the current UTC day.
    pub fn today() -> Self {
        let now = Utc::now();
        let anchor = now.duration_trunc(chrono::Duration::days(1)).unwrap_or(now);
        Self::new(anchor)
    }

    fn bar_count(lookback: Lookback, interval: BarInterval) -> usize {
        let span = chrono::Duration::days(i64::from(lookback.days));
        let step = interval.duration();
        (span.num_seconds() / step.num_seconds().max(1)).clamp(1, MAX_BARS) as usize
    }
}

impl HistoryProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn get_history(
        &self,
        symbol: &str,
        lookback: Lookback,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, DataError> {
        // Deterministic seed from symbol name
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let n = Self::bar_count(lookback, interval);
        let step = interval.duration();
        let first = self.anchor - step * (n as i32 - 1);

        let mut bars = Vec::with_capacity(n);
        let mut price = 100.0_f64;
        for i in 0..n {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let mut volume = rng.gen_range(500_000..5_000_000u64);
            // Roughly one symbol in ten ends on an outsized session.
            if i == n - 1 && rng.gen_bool(0.1) {
                volume *= 4;
            }

            bars.push(Bar {
                timestamp: first + step * i as i32,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }

        Ok(bars)
    }
}
