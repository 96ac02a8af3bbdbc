//! CSV file data adapter.
//!
//! Series live as `<dir>/<file-key>_<period>.csv` with the header
//! `date,open,high,low,close,volume`. The file key is the resolved exchange
//! symbol with `^` removed and `.` flattened to `_`.

use crate::adapters::cache_adapter::{file_key, resolve_ticker};
use crate::domain::error::NiftytraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Read an OHLCV CSV file into bars, sorted ascending by date.
pub fn read_bars(path: &Path) -> Result<Vec<OhlcvBar>, NiftytraderError> {
    let content = fs::read_to_string(path).map_err(|e| NiftytraderError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| NiftytraderError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(0).ok_or_else(|| NiftytraderError::Data {
            reason: "missing date column".into(),
        })?;
        let date =
            NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| NiftytraderError::Data {
                reason: format!("invalid date format: {}", e),
            })?;

        let open = parse_field(&record, 1, "open")?;
        let high = parse_field(&record, 2, "high")?;
        let low = parse_field(&record, 3, "low")?;
        let close = parse_field(&record, 4, "close")?;
        let volume: i64 = record
            .get(5)
            .ok_or_else(|| NiftytraderError::Data {
                reason: "missing volume column".into(),
            })?
            .parse()
            .map_err(|e| NiftytraderError::Data {
                reason: format!("invalid volume value: {}", e),
            })?;

        bars.push(OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, NiftytraderError> {
    record
        .get(index)
        .ok_or_else(|| NiftytraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .parse()
        .map_err(|e| NiftytraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

/// Write bars to an OHLCV CSV file.
pub fn write_bars(path: &Path, bars: &[OhlcvBar]) -> Result<(), NiftytraderError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| NiftytraderError::Data {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;

    wtr.write_record(["date", "open", "high", "low", "close", "volume"])
        .map_err(|e| NiftytraderError::Data {
            reason: format!("CSV write error: {}", e),
        })?;

    for bar in bars {
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])
        .map_err(|e| NiftytraderError::Data {
            reason: format!("CSV write error: {}", e),
        })?;
    }

    wtr.flush().map_err(|e| NiftytraderError::Data {
        reason: format!("CSV write error: {}", e),
    })?;
    Ok(())
}

/// Serves OHLCV series from a directory of CSV files.
#[derive(Debug)]
pub struct CsvDataAdapter {
    data_dir: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn csv_path(&self, ticker: &str, period: &str) -> PathBuf {
        let symbol = resolve_ticker(ticker);
        self.data_dir
            .join(format!("{}_{}.csv", file_key(&symbol), period))
    }
}

impl DataPort for CsvDataAdapter {
    fn fetch_ohlcv(&self, ticker: &str, period: &str) -> Result<Vec<OhlcvBar>, NiftytraderError> {
        let path = self.csv_path(ticker, period);
        if !path.exists() {
            return Err(NiftytraderError::NoData {
                ticker: ticker.to_string(),
            });
        }
        read_bars(&path)
    }

    fn list_tickers(&self) -> Result<Vec<String>, NiftytraderError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| NiftytraderError::Data {
            reason: format!("failed to read directory {}: {}", self.data_dir.display(), e),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NiftytraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                tickers.push(stem.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
