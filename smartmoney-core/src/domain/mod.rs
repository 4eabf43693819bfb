//! Domain types for the signal engine.

pub mod bar;
pub mod classification;
pub mod interval;

pub use bar::{normalize_bars, Bar};
pub use classification::{Classification, Direction, Reason, RiskLevels};
pub use interval::{BarInterval, Lookback};

/// Symbol type alias
pub type Symbol = String;
