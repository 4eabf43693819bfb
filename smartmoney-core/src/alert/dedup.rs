//! Alert deduplication: suppress re-notification inside a cool-down window.
//!
//! Per symbol: `Unnotified -> Notified(at)`. A directional classification is
//! eligible when the symbol was never notified, when the stored timestamp is
//! corrupt (fail-open), or when strictly more than `cool_down` has passed since
//! the last notification. Eligible symbols move to `Notified(now)` immediately,
//! before any delivery attempt.

use chrono::{DateTime, Duration, Utc};

use super::store::{AlertState, AlertStore};
use crate::domain::Classification;

/// Default cool-down between notifications for the same symbol.
pub const DEFAULT_COOL_DOWN_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDeduplicator {
    cool_down: Duration,
}

impl Default for AlertDeduplicator {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_COOL_DOWN_HOURS))
    }
}

impl AlertDeduplicator {
    pub fn new(cool_down: Duration) -> Self {
        Self { cool_down }
    }

    pub fn cool_down(&self) -> Duration {
        self.cool_down
    }

    /// Eligibility of a symbol in `state` at `now`. Does not touch any store.
    pub fn is_eligible(&self, state: &AlertState, now: DateTime<Utc>) -> bool {
        match state {
            AlertState::Unnotified => true,
            AlertState::Corrupt { .. } => true,
            AlertState::Notified { at } => now - *at > self.cool_down,
        }
    }

    /// Walk a batch in order, returning the eligible classifications and
    /// recording each of them in `store` at `now`.
    ///
    /// Non-directional classifications are ignored. A symbol appearing twice in
    /// one batch is eligible at most once.
    pub fn filter<'a>(
        &self,
        store: &mut dyn AlertStore,
        batch: &'a [Classification],
        now: DateTime<Utc>,
    ) -> Vec<&'a Classification> {
        let mut eligible = Vec::new();

        for c in batch {
            if !c.is_directional() {
                tracing::debug!(symbol = %c.symbol, "non-directional, ignored by dedup");
                continue;
            }

            let state = store.state(&c.symbol);
            if let AlertState::Corrupt { raw } = &state {
                tracing::warn!(
                    symbol = %c.symbol,
                    raw = %raw,
                    "corrupt alert state, treating as eligible"
                );
            }

            if self.is_eligible(&state, now) {
                store.mark_notified(&c.symbol, now);
                eligible.push(c);
            } else {
                tracing::debug!(symbol = %c.symbol, "suppressed inside cool-down window");
            }
        }

        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::MemoryAlertStore;
    use crate::domain::{Direction, Reason, RiskLevels};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap()
    }

    fn buy(symbol: &str, at: DateTime<Utc>) -> Classification {
        Classification {
            symbol: symbol.into(),
            direction: Direction::Buy,
            price: 100.0,
            levels: Some(RiskLevels {
                stop_loss: 98.0,
                take_profit: 105.0,
            }),
            reasons: vec![Reason::VolumeSpike],
            evaluated_at: at,
        }
    }

    #[test]
    fn first_signal_is_eligible() {
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        let batch = vec![buy("TCS.NS", t0())];
        let out = dedup.filter(&mut store, &batch, t0());
        assert_eq!(out.len(), 1);
        assert_eq!(store.state("TCS.NS"), AlertState::Notified { at: t0() });
    }

    #[test]
    fn second_signal_inside_window_is_suppressed() {
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        let later = t0() + Duration::hours(1);

        assert_eq!(dedup.filter(&mut store, &[buy("TCS.NS", t0())], t0()).len(), 1);
        assert!(dedup
            .filter(&mut store, &[buy("TCS.NS", later)], later)
            .is_empty());
        // State still points at the first notification.
        assert_eq!(store.state("TCS.NS"), AlertState::Notified { at: t0() });
    }

    #[test]
    fn exactly_at_cool_down_is_suppressed_just_after_is_eligible() {
        let dedup = AlertDeduplicator::default();
        let notified = AlertState::Notified { at: t0() };
        assert!(!dedup.is_eligible(&notified, t0() + Duration::hours(24)));
        assert!(dedup.is_eligible(
            &notified,
            t0() + Duration::hours(24) + Duration::milliseconds(1)
        ));
    }

    #[test]
    fn exact_window_after_sub_millisecond_notification_is_suppressed() {
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        let notified = t0() + Duration::microseconds(500);
        let batch = vec![buy("TCS.NS", notified)];

        assert_eq!(dedup.filter(&mut store, &batch, notified).len(), 1);
        let at_boundary = notified + Duration::hours(24);
        assert!(dedup.filter(&mut store, &batch, at_boundary).is_empty());
        let just_after = at_boundary + Duration::nanoseconds(1);
        assert_eq!(dedup.filter(&mut store, &batch, just_after).len(), 1);
    }

    #[test]
    fn corrupt_state_fails_open() {
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        store.insert_raw("LT.NS", "garbage");
        let batch = [buy("LT.NS", t0())];
        let out = dedup.filter(&mut store, &batch, t0());
        assert_eq!(out.len(), 1);
        assert_eq!(store.state("LT.NS"), AlertState::Notified { at: t0() });
    }

    #[test]
    fn none_direction_never_touches_state() {
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        let mut c = buy("INFY.NS", t0());
        c.direction = Direction::None;
        c.levels = None;
        assert!(dedup.filter(&mut store, &[c], t0()).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_symbol_in_batch_notifies_once() {
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        let batch = vec![buy("TCS.NS", t0()), buy("TCS.NS", t0())];
        assert_eq!(dedup.filter(&mut store, &batch, t0()).len(), 1);
    }
}
