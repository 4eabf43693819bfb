//! Alert deduplication and the state it carries across scans.

pub mod dedup;
pub mod store;

pub use dedup::{AlertDeduplicator, DEFAULT_COOL_DOWN_HOURS};
pub use store::{AlertState, AlertStateError, AlertStore, JsonFileAlertStore, MemoryAlertStore};
