//! Rule components: indicator engine, volume detector, classifier, risk levels.
//!
//! Each component is a pure function of its inputs. State carried across scans
//! lives only in the alert deduplicator (`crate::alert`).

pub mod indicator;
pub mod risk;
pub mod signal;
pub mod volume;

pub use indicator::{
    compute_indicators, Indicator, IndicatorParams, IndicatorSeries, LatestIndicators,
};
pub use risk::RiskCalculator;
pub use signal::{SignalInputs, SignalRules, SignalVerdict};
pub use volume::{VolumeReading, VolumeRule};
