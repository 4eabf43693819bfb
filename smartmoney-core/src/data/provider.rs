//! History provider trait and structured error types.
//!
//! The `HistoryProvider` trait abstracts over data sources (Yahoo Finance,
//! synthetic random walks, test fixtures) so the scanner never depends on a
//! concrete backend.

use thiserror::Error;

use crate::domain::{Bar, BarInterval, Lookback};

/// Structured error types for history fetches.
///
/// Every variant means the provider could not serve the symbol this time; the
/// scanner skips the symbol and carries on.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for OHLCV history sources.
///
/// Implementations must return bars with strictly increasing, unique
/// timestamps (see `domain::normalize_bars`) and may return fewer bars than
/// the lookback implies.
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` covering `lookback` at `interval` granularity.
    fn get_history(
        &self,
        symbol: &str,
        lookback: Lookback,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}
