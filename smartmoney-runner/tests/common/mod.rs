//! Shared fixtures for runner integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use smartmoney_core::data::{DataError, HistoryProvider};
use smartmoney_core::domain::{Bar, BarInterval, Lookback};
use smartmoney_core::notify::{Notifier, NotifyError};
use smartmoney_runner::ScanConfig;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap()
}

fn series(closes: impl Iterator<Item = f64>, last_volume: u64) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut bars: Vec<Bar> = closes
        .enumerate()
        .map(|(i, c)| Bar {
            timestamp: base + Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1_000,
        })
        .collect();
    if let Some(last) = bars.last_mut() {
        last.volume = last_volume;
    }
    bars
}

/// 60 strictly rising closes, flat volume, last bar at `last_volume`.
pub fn rising(last_volume: u64) -> Vec<Bar> {
    series((0..60).map(|i| 100.0 + i as f64), last_volume)
}

/// 60 strictly falling closes, flat volume, last bar at `last_volume`.
pub fn falling(last_volume: u64) -> Vec<Bar> {
    series((0..60).map(|i| 200.0 - i as f64), last_volume)
}

pub fn flat(len: usize) -> Vec<Bar> {
    series(std::iter::repeat(100.0).take(len), 1_000)
}

/// Fixed per-symbol responses. Unknown symbols are `SymbolNotFound`.
#[derive(Default)]
pub struct MockProvider {
    responses: HashMap<String, Result<Vec<Bar>, DataError>>,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn with(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.responses.insert(symbol.to_string(), Ok(bars));
        self
    }

    pub fn failing(mut self, symbol: &str, err: DataError) -> Self {
        self.responses.insert(symbol.to_string(), Err(err));
        self
    }
}

impl HistoryProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn get_history(
        &self,
        symbol: &str,
        _lookback: Lookback,
        _interval: BarInterval,
    ) -> Result<Vec<Bar>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| {
                Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            })
    }
}

/// Records every payload. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(NotifyError::Rejected { status: 502 })
        } else {
            Ok(())
        }
    }
}

/// Default config with the throttle switched off.
pub fn fast_config() -> ScanConfig {
    let mut config = ScanConfig::default();
    config.scan.throttle_ms = 0;
    config.scan.analysis_threads = 2;
    config
}

pub fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
