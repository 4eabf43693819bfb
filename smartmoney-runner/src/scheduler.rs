//! Fixed-interval scan loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::scanner::ScanError;
use crate::session::{CycleReport, ScanSession};

/// Granularity at which a sleeping scheduler notices the stop flag.
const STOP_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    pub every: Duration,
    /// Stop after this many completed cycles. `None` runs until stopped.
    pub max_cycles: Option<usize>,
}

impl Scheduler {
    pub fn new(every: Duration) -> Self {
        Self {
            every,
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Run scans until `max_cycles` is reached (forever when unset), invoking
    /// `on_cycle` after each one. Returns the number of completed cycles.
    ///
    /// The next scan starts `every` after the previous one started; a scan that
    /// overruns its slot is followed immediately by the next.
    pub fn run<F>(&self, session: &ScanSession, symbols: &[String], on_cycle: F) -> usize
    where
        F: FnMut(&CycleReport),
    {
        self.drive(session, symbols, None, on_cycle)
    }

    /// Like [`Scheduler::run`], but also returns once `stop` is set. A sleeping
    /// scheduler notices the flag within `STOP_POLL`.
    pub fn run_until<F>(
        &self,
        session: &ScanSession,
        symbols: &[String],
        stop: &AtomicBool,
        on_cycle: F,
    ) -> usize
    where
        F: FnMut(&CycleReport),
    {
        self.drive(session, symbols, Some(stop), on_cycle)
    }

    fn drive<F>(
        &self,
        session: &ScanSession,
        symbols: &[String],
        stop: Option<&AtomicBool>,
        mut on_cycle: F,
    ) -> usize
    where
        F: FnMut(&CycleReport),
    {
        let mut completed = 0;

        while !is_set(stop) {
            if self.max_cycles.is_some_and(|max| completed >= max) {
                break;
            }

            let started = Instant::now();
            match session.run_once(symbols, Utc::now()) {
                Ok(report) => {
                    completed += 1;
                    on_cycle(&report);
                }
                Err(ScanError::ScanInProgress) => {
                    tracing::warn!("scan cycle skipped, previous scan still running")
                }
                Err(e) => {
                    tracing::error!(error = %e, "scan cycle failed, stopping scheduler");
                    break;
                }
            }

            if self.max_cycles.is_some_and(|max| completed >= max) {
                break;
            }
            sleep_until(started + self.every, stop);
        }

        tracing::info!(cycles = completed, "scheduler stopped");
        completed
    }
}

fn is_set(stop: Option<&AtomicBool>) -> bool {
    stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn sleep_until(deadline: Instant, stop: Option<&AtomicBool>) {
    loop {
        if is_set(stop) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(STOP_POLL));
    }
}
