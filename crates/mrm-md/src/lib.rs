//! mrm-md
//!
//! Daily market snapshot consumed by the reconciler and the alert detector.
//!
//! Two file adapters produce a [`MarketSnapshot`]:
//! - [`snapshot_json`]: a ready-made snapshot document
//! - [`bars`]: a daily OHLCV history from which every snapshot field is
//!   derived (change %, 50-bar MA, 252-bar low/high, trade date)
//!
//! Prices are [`Micros`]; percentages and valuation multiples are `f64`.
//! This crate does no network IO.

pub mod bars;
pub mod snapshot_json;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use mrm_ledger::Micros;
use serde::Serialize;

/// One instrument's price state for the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentSnapshot {
    pub close: Micros,
    /// Session low.
    pub low: Micros,
    pub prev_close: Micros,
    /// Close-to-close change in percent.
    pub change_pct: f64,
    pub ma_50: Micros,
    pub low_252: Micros,
    pub high_252: Micros,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
}

/// (close − prev_close) / prev_close × 100; 0 when prev_close is not positive.
pub fn change_pct(close: Micros, prev_close: Micros) -> f64 {
    if !prev_close.is_positive() {
        return 0.0;
    }
    (close.to_f64() - prev_close.to_f64()) / prev_close.to_f64() * 100.0
}

/// Read-only market view for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub trade_date: NaiveDate,
    pub instruments: BTreeMap<String, InstrumentSnapshot>,
}

impl MarketSnapshot {
    pub fn new(trade_date: NaiveDate) -> Self {
        Self {
            trade_date,
            instruments: BTreeMap::new(),
        }
    }

    pub fn with_instrument(mut self, symbol: impl Into<String>, inst: InstrumentSnapshot) -> Self {
        self.instruments.insert(symbol.into(), inst);
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentSnapshot> {
        self.instruments.get(symbol)
    }

    pub fn close_of(&self, symbol: &str) -> Option<Micros> {
        self.get(symbol).map(|i| i.close)
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Anything that can hand the batch a market snapshot.
pub trait MarketDataSource {
    /// A short label for logs, e.g. the file path.
    fn describe(&self) -> String;

    /// `Ok(None)` means the source holds no usable data for any symbol.
    fn load(&self) -> Result<Option<MarketSnapshot>>;
}

/// Snapshot JSON document on disk.
#[derive(Debug, Clone)]
pub struct SnapshotJsonFile(pub PathBuf);

impl MarketDataSource for SnapshotJsonFile {
    fn describe(&self) -> String {
        format!("snapshot-json:{}", self.0.display())
    }

    fn load(&self) -> Result<Option<MarketSnapshot>> {
        let snap = snapshot_json::load_snapshot_json(&self.0)?;
        Ok(if snap.is_empty() { None } else { Some(snap) })
    }
}

/// Daily bar history CSV on disk.
#[derive(Debug, Clone)]
pub struct BarsCsvFile(pub PathBuf);

impl MarketDataSource for BarsCsvFile {
    fn describe(&self) -> String {
        format!("bars-csv:{}", self.0.display())
    }

    fn load(&self) -> Result<Option<MarketSnapshot>> {
        let parsed = bars::load_bars_csv(&self.0)?;
        Ok(bars::derive_snapshot(&parsed.bars))
    }
}

/// Pick the adapter by file extension (`.json` or `.csv`).
pub fn source_for_path(path: &Path) -> Result<Box<dyn MarketDataSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => Ok(Box::new(SnapshotJsonFile(path.to_path_buf()))),
        Some("csv") => Ok(Box::new(BarsCsvFile(path.to_path_buf()))),
        _ => bail!(
            "unsupported market data file '{}': expected .json or .csv",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_pct_from_prev_close() {
        let c = change_pct(Micros::from_dollars(94), Micros::from_dollars(100));
        assert!((c + 6.0).abs() < 1e-9);
        assert_eq!(change_pct(Micros::from_dollars(1), Micros::ZERO), 0.0);
    }

    #[test]
    fn source_by_extension() {
        assert!(source_for_path(Path::new("m.JSON"))
            .unwrap()
            .describe()
            .starts_with("snapshot-json:"));
        assert!(source_for_path(Path::new("bars.csv"))
            .unwrap()
            .describe()
            .starts_with("bars-csv:"));
        assert!(source_for_path(Path::new("bars.txt")).is_err());
    }
}
