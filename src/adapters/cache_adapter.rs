//! File-backed cache over a data port, plus ticker symbol resolution.
//!
//! Cache entries are CSV files keyed by (resolved symbol, period). An entry
//! younger than the staleness bound is served without consulting the inner
//! port; anything older or missing is refetched and written back. A failed
//! cache write does not fail the fetch.

use crate::adapters::csv_adapter;
use crate::domain::error::NiftytraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cache entries older than this are treated as expired.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Common Indian market names and their exchange symbols.
const POPULAR_TICKERS: &[(&str, &str)] = &[
    ("NIFTY50", "^NSEI"),
    ("BANKNIFTY", "^NSEBANK"),
    ("SENSEX", "^BSESN"),
    ("RELIANCE", "RELIANCE.NS"),
    ("TCS", "TCS.NS"),
    ("INFY", "INFY.NS"),
    ("HDFC", "HDFCBANK.NS"),
    ("ICICI", "ICICIBANK.NS"),
    ("ITC", "ITC.NS"),
    ("SBIN", "SBIN.NS"),
    ("WIPRO", "WIPRO.NS"),
    ("BHARTIARTL", "BHARTIARTL.NS"),
    ("KOTAKBANK", "KOTAKBANK.NS"),
    ("LT", "LT.NS"),
    ("HINDUNILVR", "HINDUNILVR.NS"),
];

/// Convert a common name to an exchange symbol.
///
/// Names already carrying `.` or `^` pass through unchanged; known names use
/// the table; anything else is assumed to be an NSE stock.
pub fn resolve_ticker(name: &str) -> String {
    if name.contains('.') || name.contains('^') {
        return name.to_string();
    }

    let upper = name.to_uppercase();
    for (alias, symbol) in POPULAR_TICKERS {
        if *alias == upper {
            return (*symbol).to_string();
        }
    }

    format!("{}.NS", upper)
}

/// Filesystem-safe key for a resolved symbol: `^` dropped, `.` flattened.
pub fn file_key(symbol: &str) -> String {
    symbol.replace('^', "").replace('.', "_")
}

#[derive(Debug)]
pub struct CachedDataAdapter<P: DataPort> {
    inner: P,
    cache_dir: PathBuf,
    max_age: Duration,
}

impl<P: DataPort> CachedDataAdapter<P> {
    pub fn new(inner: P, cache_dir: PathBuf) -> Self {
        Self {
            inner,
            cache_dir,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(inner: P, cache_dir: PathBuf, max_age: Duration) -> Self {
        Self {
            inner,
            cache_dir,
            max_age,
        }
    }

    fn cache_path(&self, ticker: &str, period: &str) -> PathBuf {
        let symbol = resolve_ticker(ticker);
        self.cache_dir
            .join(format!("{}_{}.csv", file_key(&symbol), period))
    }

    fn is_fresh(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age < self.max_age)
    }
}

impl<P: DataPort> DataPort for CachedDataAdapter<P> {
    fn fetch_ohlcv(&self, ticker: &str, period: &str) -> Result<Vec<OhlcvBar>, NiftytraderError> {
        let path = self.cache_path(ticker, period);

        if path.exists() && self.is_fresh(&path) {
            if let Ok(bars) = csv_adapter::read_bars(&path) {
                return Ok(bars);
            }
            // Unreadable cache entry: fall through to a refetch.
        }

        let bars = self.inner.fetch_ohlcv(ticker, period)?;

        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = csv_adapter::write_bars(&path, &bars) {
            eprintln!("Warning: failed to cache {}: {}", path.display(), e);
        }

        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, NiftytraderError> {
        self.inner.list_tickers()
    }
}
