//! Smart Money core: the signal-generation and alert-deduplication engine.
//!
//! This crate contains:
//! - Domain types (bars, intervals, classifications, risk levels)
//! - Indicator engine (EMA trend averages, RSI momentum oscillator)
//! - Volume anomaly detector, signal classifier, risk calculator
//! - Alert deduplicator with in-memory and JSON-file state stores
//! - History providers (Yahoo Finance, synthetic) behind a trait
//! - Symbol universe loading and notification channels

pub mod alert;
pub mod components;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod notify;

pub use error::AnalysisError;
