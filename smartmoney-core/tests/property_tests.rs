//! Property tests for signal-engine invariants.
//!
//! Uses proptest to verify:
//! 1. Oscillator bounds: RSI is in [0, 100] wherever defined, undefined before bar 14
//! 2. Determinism: indicators are a pure function of the bars
//! 3. Risk side invariant: levels sit on the correct side of price
//! 4. Dedup window: a symbol is re-eligible only strictly after the cool-down

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use smartmoney_core::alert::{AlertDeduplicator, MemoryAlertStore};
use smartmoney_core::components::{compute_indicators, Indicator, IndicatorParams, RiskCalculator};
use smartmoney_core::domain::{Bar, Classification, Direction};
use smartmoney_core::indicators::Rsi;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, 1..120)
}

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..50_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn to_bars(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            timestamp: base + Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1_000,
        })
        .collect()
}

// ── 1. Oscillator Bounds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_bounded_and_warm_up_undefined(closes in arb_closes()) {
        let rsi = Rsi::new(14).compute(&to_bars(&closes));
        prop_assert_eq!(rsi.len(), closes.len());
        for (i, v) in rsi.iter().enumerate() {
            if i < 14 {
                prop_assert!(v.is_nan(), "index {} should be undefined, got {}", i, v);
            } else {
                prop_assert!((0.0..=100.0).contains(v), "index {} out of range: {}", i, v);
            }
        }
    }
}

// ── 2. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn indicators_are_deterministic(closes in arb_closes()) {
        let bars = to_bars(&closes);
        let params = IndicatorParams::default();
        let a = compute_indicators(&bars, &params).unwrap().latest();
        let b = compute_indicators(&bars, &params).unwrap().latest();
        prop_assert_eq!(a.fast.map(f64::to_bits), b.fast.map(f64::to_bits));
        prop_assert_eq!(a.slow.map(f64::to_bits), b.slow.map(f64::to_bits));
        prop_assert_eq!(a.momentum.map(f64::to_bits), b.momentum.map(f64::to_bits));
    }
}

// ── 3. Risk Side Invariant ───────────────────────────────────────────

proptest! {
    #[test]
    fn risk_levels_on_correct_side(
        price in arb_price(),
        sl in 0.5..20.0_f64,
        tp in 0.5..30.0_f64,
    ) {
        let calc = RiskCalculator::new(sl, tp);

        let buy = calc.levels(Direction::Buy, price).unwrap().unwrap();
        prop_assert!(buy.stop_loss < price && price < buy.take_profit);

        let sell = calc.levels(Direction::Sell, price).unwrap().unwrap();
        prop_assert!(sell.take_profit < price && price < sell.stop_loss);

        prop_assert!(calc.levels(Direction::None, price).unwrap().is_none());
    }
}

// ── 4. Dedup Window ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn dedup_reeligible_only_after_window(gap_minutes in 0i64..(72 * 60)) {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap();
        let dedup = AlertDeduplicator::default();
        let mut store = MemoryAlertStore::new();
        let batch = vec![Classification {
            symbol: "TCS.NS".to_string(),
            direction: Direction::Buy,
            price: 100.0,
            levels: None,
            reasons: vec![],
            evaluated_at: t0,
        }];

        prop_assert_eq!(dedup.filter(&mut store, &batch, t0).len(), 1);

        let later = t0 + Duration::minutes(gap_minutes);
        let again = dedup.filter(&mut store, &batch, later).len();
        prop_assert_eq!(again, usize::from(gap_minutes > 24 * 60));
    }
}
