//! Symbol universe: the ordered list of symbols a scan walks.
//!
//! The universe is read from a CSV file with a `symbol` column (one ticker per
//! row, Yahoo-style suffixes such as `TCS.NS`). When the file cannot be used the
//! built-in sample list is returned instead, so a scan always has something to do.

use std::path::Path;

use thiserror::Error;

/// Built-in fallback universe.
pub const SAMPLE_SYMBOLS: &[&str] = &[
    "TCS.NS",
    "INFY.NS",
    "RELIANCE.NS",
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "LT.NS",
    "TATAMOTORS.NS",
    "BAJFINANCE.NS",
];

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read symbols file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse symbols CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("symbols CSV has no 'symbol' column")]
    MissingSymbolColumn,

    #[error("symbols file contains no symbols")]
    Empty,
}

/// Ordered list of symbols to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    symbols: Vec<String>,
}

impl Universe {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    /// The built-in sample list.
    pub fn sample() -> Self {
        Self::new(SAMPLE_SYMBOLS.iter().map(|s| s.to_string()).collect())
    }

    /// Load a universe from a CSV file with a `symbol` column.
    pub fn from_csv_file(path: &Path) -> Result<Self, UniverseError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parse a universe from any CSV source. Blank cells are dropped, order is kept.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, UniverseError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let col = rdr
            .headers()?
            .iter()
            .position(|h| h == "symbol")
            .ok_or(UniverseError::MissingSymbolColumn)?;

        let mut symbols = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if let Some(sym) = record.get(col).filter(|s| !s.is_empty()) {
                symbols.push(sym.to_string());
            }
        }

        if symbols.is_empty() {
            return Err(UniverseError::Empty);
        }
        Ok(Self::new(symbols))
    }

    /// Load from `path`, falling back to the sample list on any failure.
    pub fn load_or_sample(path: &Path) -> Self {
        match Self::from_csv_file(path) {
            Ok(u) => {
                tracing::info!(path = %path.display(), symbols = u.len(), "loaded symbol universe");
                u
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "symbols file unusable, falling back to built-in sample list"
                );
                Self::sample()
            }
        }
    }

    /// Keep at most the first `count` symbols.
    pub fn truncate(mut self, count: usize) -> Self {
        self.symbols.truncate(count);
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
