//! Market data: provider trait, Yahoo and synthetic providers, symbol universe.

pub mod circuit_breaker;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use provider::{DataError, HistoryProvider};
pub use synthetic::SyntheticProvider;
pub use universe::{Universe, UniverseError, SAMPLE_SYMBOLS};
pub use yahoo::{YahooProvider, YahooSettings};
