//! Smart Money runner: scan orchestration, alert dispatch, scheduling.
//!
//! This crate builds on `smartmoney-core` to provide:
//! - TOML scan configuration with validation
//! - Per-symbol analysis (indicators, classification, risk levels)
//! - Throttled universe scans with isolated per-symbol failures
//! - Deduplicated alert dispatch, one message per scan
//! - A non-reentrant scan session and a fixed-interval scheduler

pub mod analyze;
pub mod config;
pub mod dispatch;
pub mod scanner;
pub mod scheduler;
pub mod session;

pub use analyze::{Analyzer, ScanRow, SkipReason};
pub use config::{ChannelKind, ConfigError, ScanConfig};
pub use dispatch::{AlertDispatcher, Delivery, DispatchReport};
pub use scanner::{ScanError, ScanReport, Scanner, SkippedSymbol, Throttle};
pub use scheduler::Scheduler;
pub use session::{CycleReport, ScanSession};
