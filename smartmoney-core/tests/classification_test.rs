//! Scenario tests: bars → indicators → rules → classification → risk levels.

use chrono::{DateTime, Duration, TimeZone, Utc};
use smartmoney_core::components::{
    compute_indicators, IndicatorParams, RiskCalculator, SignalInputs, SignalRules, VolumeRule,
};
use smartmoney_core::domain::{Bar, Classification, Direction, Reason};

// ── Helpers ──────────────────────────────────────────────────────────

fn bars(closes: &[f64], volumes: &[u64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| Bar {
            timestamp: base + Duration::days(i as i64),
            open: c,
            high: c + 0.5,
            low: c - 0.5,
            close: c,
            volume: v,
        })
        .collect()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap()
}

/// The full per-symbol pipeline with default parameters.
fn classify(symbol: &str, bars: &[Bar]) -> Classification {
    let series = compute_indicators(bars, &IndicatorParams::default()).unwrap();
    let latest = series.latest();
    let volume = VolumeRule::default();
    let reading = volume.read(bars).unwrap();
    let price = bars[bars.len() - 1].close;

    let inputs = SignalInputs {
        price,
        fast: latest.fast.unwrap(),
        slow: latest.slow.unwrap(),
        momentum: latest.momentum,
        spike: volume.is_spike(reading.today, reading.baseline),
    };
    let mut c = SignalRules::default().classify(symbol, &inputs, now());
    c.levels = RiskCalculator::default().levels(c.direction, price).unwrap();
    c
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn rising_closes_with_triple_volume_is_buy() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let mut volumes = vec![1_000u64; 60];
    volumes[59] = 3_000;

    let c = classify("TCS.NS", &bars(&closes, &volumes));
    assert_eq!(c.direction, Direction::Buy);
    assert_eq!(c.reasons.len(), 3);
    assert_eq!(c.reasons[0], Reason::VolumeSpike);
    assert_eq!(
        c.reasons[1],
        Reason::TrendUp {
            fast_span: 20,
            slow_span: 50
        }
    );
    match c.reasons[2] {
        Reason::Momentum { value } => assert!(value >= 56.0),
        ref other => panic!("expected momentum, got {other:?}"),
    }
    assert_eq!(c.reason_summary(), format!("Volume spike, 20>50 EMA, {}", c.reasons[2]));
    assert!(c.stop_loss().unwrap() < c.price && c.price < c.take_profit().unwrap());
}

#[test]
fn falling_closes_with_spike_is_sell() {
    let closes: Vec<f64> = (0..60).map(|i| 300.0 - 2.0 * i as f64).collect();
    let mut volumes = vec![10_000u64; 60];
    volumes[59] = 25_000;

    let c = classify("INFY.NS", &bars(&closes, &volumes));
    assert_eq!(c.direction, Direction::Sell);
    assert!(matches!(c.reasons[1], Reason::TrendDown { .. }));
    assert!(c.take_profit().unwrap() < c.price && c.price < c.stop_loss().unwrap());
}

#[test]
fn trend_and_momentum_without_spike_is_none_with_reasons() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let volumes = vec![1_000u64; 60];

    let c = classify("TCS.NS", &bars(&closes, &volumes));
    assert_eq!(c.direction, Direction::None);
    assert!(c.levels.is_none());
    // Reasons still document what fired.
    assert!(matches!(c.reasons[0], Reason::TrendUp { .. }));
    assert!(matches!(c.reasons[1], Reason::Momentum { .. }));
}

#[test]
fn flat_series_does_not_crash_and_is_none() {
    let c = classify("FLAT.NS", &bars(&[250.0; 60], &[5_000; 60]));
    assert_eq!(c.direction, Direction::None);
    assert!(c.levels.is_none());
}

#[test]
fn short_history_has_no_oscillator_reason() {
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let mut volumes = vec![1_000u64; 10];
    volumes[9] = 5_000;

    let c = classify("NEW.NS", &bars(&closes, &volumes));
    assert_eq!(c.direction, Direction::None);
    assert!(c
        .reasons
        .iter()
        .all(|r| !matches!(r, Reason::Momentum { .. })));
    assert_eq!(c.reasons[0], Reason::VolumeSpike);
}

#[test]
fn single_bar_has_no_spike() {
    let c = classify("ONE.NS", &bars(&[100.0], &[1_000_000]));
    assert_eq!(c.direction, Direction::None);
    assert!(c.reasons.is_empty());
}

#[test]
fn re_evaluation_is_idempotent() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
    let volumes: Vec<u64> = (0..60).map(|i| 1_000 + (i * 37 % 500) as u64).collect();
    let b = bars(&closes, &volumes);

    assert_eq!(classify("X.NS", &b), classify("X.NS", &b));
}
