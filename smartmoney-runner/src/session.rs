//! A long-lived scan session: provider, notifier and alert state bundled
//! behind a non-reentrant entry point.

use std::sync::{Mutex, TryLockError};

use chrono::{DateTime, Utc};

use smartmoney_core::alert::AlertStore;
use smartmoney_core::data::HistoryProvider;
use smartmoney_core::notify::Notifier;

use crate::config::ScanConfig;
use crate::dispatch::{AlertDispatcher, DispatchReport};
use crate::scanner::{ScanError, ScanReport, Scanner};

/// Result of one scan plus its alert dispatch.
#[derive(Debug)]
pub struct CycleReport {
    pub scan: ScanReport,
    pub dispatch: DispatchReport,
}

/// Owns everything a scan needs. The alert store sits behind a mutex that is
/// held for the whole cycle, so a second `run_once` while one is in flight
/// fails fast with `ScanInProgress` instead of racing the dedup state.
pub struct ScanSession {
    config: ScanConfig,
    provider: Box<dyn HistoryProvider>,
    notifier: Box<dyn Notifier>,
    store: Mutex<Box<dyn AlertStore>>,
}

impl ScanSession {
    pub fn new(
        config: ScanConfig,
        provider: Box<dyn HistoryProvider>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn AlertStore>,
    ) -> Self {
        Self {
            config,
            provider,
            notifier,
            store: Mutex::new(store),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan without touching alert state or the notifier.
    pub fn preview(&self, symbols: &[String], now: DateTime<Utc>) -> Result<ScanReport, ScanError> {
        let scanner = Scanner::new(&*self.provider, &self.config)?;
        Ok(scanner.scan(symbols, now))
    }

    /// Scan `symbols`, then dedup and dispatch the directional batch.
    pub fn run_once(
        &self,
        symbols: &[String],
        now: DateTime<Utc>,
    ) -> Result<CycleReport, ScanError> {
        let mut store = match self.store.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                tracing::warn!("scan requested while another is running");
                return Err(ScanError::ScanInProgress);
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let scanner = Scanner::new(&*self.provider, &self.config)?;
        let scan = scanner.scan(symbols, now);

        let dispatcher = AlertDispatcher::new(self.config.deduplicator(), &*self.notifier);
        let dispatch = dispatcher.dispatch(&mut **store, &scan.classifications(), now);

        Ok(CycleReport { scan, dispatch })
    }
}
