//! Scan orchestration: fetch every symbol, classify, rank.
//!
//! Fetching is sequential and throttled because the history provider is the
//! rate-limited bottleneck. Analysis of the fetched series is CPU-only and runs
//! on a private bounded rayon pool. Row order after the parallel phase matches
//! universe order, so the volume sort below breaks ties by universe position.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use smartmoney_core::data::{DataError, HistoryProvider};
use smartmoney_core::domain::{Bar, BarInterval, Classification, Lookback};

use crate::analyze::{Analyzer, ScanRow, SkipReason};
use crate::config::ScanConfig;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("a scan is already running")]
    ScanInProgress,

    #[error("failed to build analysis thread pool: {0}")]
    ThreadPool(String),
}

/// Enforces a minimum spacing between consecutive provider calls.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Block until at least `min_interval` has passed since the previous call.
    /// The first call never waits.
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// A symbol that produced no row, and why.
#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Outcome of one pass over the universe.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub evaluated_at: DateTime<Utc>,
    /// Symbols attempted.
    pub scanned: usize,
    /// Directional rows, highest volume first.
    pub rows: Vec<ScanRow>,
    /// Symbols classified NONE.
    pub neutral: usize,
    #[serde(skip)]
    pub skipped: Vec<SkippedSymbol>,
}

impl ScanReport {
    /// The display view: at most `n` rows from the head of the ranking.
    pub fn top(&self, n: usize) -> &[ScanRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Every directional classification, in ranking order.
    pub fn classifications(&self) -> Vec<Classification> {
        self.rows.iter().map(|r| r.classification.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs scans against one provider with one analysis configuration.
pub struct Scanner<'p> {
    provider: &'p dyn HistoryProvider,
    analyzer: Analyzer,
    lookback: Lookback,
    interval: BarInterval,
    throttle: Duration,
    pool: rayon::ThreadPool,
}

impl<'p> Scanner<'p> {
    pub fn new(provider: &'p dyn HistoryProvider, config: &ScanConfig) -> Result<Self, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.scan.analysis_threads)
            .thread_name(|i| format!("smartmoney-analysis-{i}"))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

        Ok(Self {
            provider,
            analyzer: Analyzer::from_config(config),
            lookback: config.lookback(),
            interval: config.scan.interval,
            throttle: Duration::from_millis(config.scan.throttle_ms),
            pool,
        })
    }

    /// Scan `symbols` in order. Per-symbol failures are recorded as skips and
    /// never abort the pass.
    pub fn scan(&self, symbols: &[String], evaluated_at: DateTime<Utc>) -> ScanReport {
        let fetched = self.fetch_all(symbols);

        let analysed: Vec<(String, Result<ScanRow, SkipReason>)> = self.pool.install(|| {
            fetched
                .into_par_iter()
                .map(|(symbol, history)| {
                    let outcome = history.map_err(SkipReason::from).and_then(|bars| {
                        self.analyzer
                            .analyze(&symbol, &bars, evaluated_at)
                            .map_err(SkipReason::from)
                    });
                    (symbol, outcome)
                })
                .collect()
        });

        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        let mut neutral = 0;
        for (symbol, outcome) in analysed {
            match outcome {
                Ok(row) if row.classification.is_directional() => rows.push(row),
                Ok(_) => neutral += 1,
                Err(reason) => {
                    tracing::info!(symbol = %symbol, reason = %reason, "symbol skipped");
                    skipped.push(SkippedSymbol { symbol, reason });
                }
            }
        }

        // Stable: equal volumes keep universe order.
        rows.sort_by(|a, b| b.volume.cmp(&a.volume));

        tracing::info!(
            scanned = symbols.len(),
            directional = rows.len(),
            neutral,
            skipped = skipped.len(),
            "scan complete"
        );

        ScanReport {
            evaluated_at,
            scanned: symbols.len(),
            rows,
            neutral,
            skipped,
        }
    }

    fn fetch_all(&self, symbols: &[String]) -> Vec<(String, Result<Vec<Bar>, DataError>)> {
        let mut throttle = Throttle::new(self.throttle);
        let mut out = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            if !self.provider.is_available() {
                out.push((symbol.clone(), Err(DataError::CircuitBreakerTripped)));
                continue;
            }
            throttle.wait();
            let history = self
                .provider
                .get_history(symbol, self.lookback, self.interval);
            if let Err(e) = &history {
                tracing::warn!(
                    symbol = %symbol,
                    provider = self.provider.name(),
                    error = %e,
                    "history fetch failed"
                );
            }
            out.push((symbol.clone(), history));
        }

        out
    }
}
