//! Alert state stores: per-symbol "last notified" timestamps.
//!
//! Values are kept as RFC 3339 strings exactly as stored, so a damaged entry is
//! visible to the deduplicator as `AlertState::Corrupt` instead of silently
//! disappearing.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertStateError {
    #[error("alert state I/O: {0}")]
    Io(#[from] io::Error),

    #[error("alert state serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Notification state of one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertState {
    Unnotified,
    Notified { at: DateTime<Utc> },
    /// A stored value that does not parse as a timestamp.
    Corrupt { raw: String },
}

impl AlertState {
    fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => AlertState::Unnotified,
            Some(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(at) => AlertState::Notified {
                    at: at.with_timezone(&Utc),
                },
                Err(_) => AlertState::Corrupt { raw: s.to_string() },
            },
        }
    }
}

/// Owned key-value store for alert state.
///
/// Mutation takes `&mut self`, so one scan holding the store is the only writer.
pub trait AlertStore: Send {
    /// Raw stored value for `symbol`, if any.
    fn raw(&self, symbol: &str) -> Option<&str>;

    /// Record a notification for `symbol` at `at`.
    fn mark_notified(&mut self, symbol: &str, at: DateTime<Utc>);

    /// Persist pending changes. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<(), AlertStateError> {
        Ok(())
    }

    /// Number of symbols with stored state.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parsed state for `symbol`.
    fn state(&self, symbol: &str) -> AlertState {
        AlertState::from_raw(self.raw(symbol))
    }
}

fn encode(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Process-lifetime store. State is lost on restart (every symbol back to
/// `Unnotified`).
#[derive(Debug, Clone, Default)]
pub struct MemoryAlertStore {
    entries: BTreeMap<String, String>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw value as-is, bypassing timestamp encoding.
    pub fn insert_raw(&mut self, symbol: impl Into<String>, raw: impl Into<String>) {
        self.entries.insert(symbol.into(), raw.into());
    }
}

impl AlertStore for MemoryAlertStore {
    fn raw(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).map(String::as_str)
    }

    fn mark_notified(&mut self, symbol: &str, at: DateTime<Utc>) {
        self.entries.insert(symbol.to_string(), encode(at));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// JSON-file store: `{"TCS.NS": "2024-06-03T09:15:00.000000000Z", ...}`.
///
/// Survives restarts. Writes go to a temporary file that is renamed over the
/// target, so a crash mid-write leaves the previous state intact.
#[derive(Debug)]
pub struct JsonFileAlertStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl JsonFileAlertStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable or
    /// malformed file is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "alert state file unreadable, starting with empty state"
                );
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries,
            dirty: false,
        }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, AlertStateError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;
        // Non-string values are kept in their JSON form so they surface as corrupt.
        Ok(raw
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect())
    }
}

impl AlertStore for JsonFileAlertStore {
    fn raw(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).map(String::as_str)
    }

    fn mark_notified(&mut self, symbol: &str, at: DateTime<Utc>) {
        self.entries.insert(symbol.to_string(), encode(at));
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<(), AlertStateError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
