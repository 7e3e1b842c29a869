//! Snapshot JSON adapter.
//!
//! ```json
//! {
//!   "trade_date": "2026-01-26",
//!   "instruments": {
//!     "ROP": { "close": 402.1, "low": 398.0, "prev_close": 410.0,
//!              "ma_50": 415.2, "low_252": 380.0, "high_252": 520.0,
//!              "trailing_pe": 31.2, "forward_pe": 25.0 }
//!   }
//! }
//! ```
//!
//! `change_pct` is optional and derived from `prev_close` when absent.
//! An instrument with a non-positive close or low is dropped with a warning;
//! the rest of the document still loads.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mrm_ledger::{dates::normalize_date, micros_from_f64, Micros, PriceError};
use serde::Deserialize;

use crate::{change_pct, InstrumentSnapshot, MarketSnapshot};

#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    trade_date: String,
    #[serde(default)]
    instruments: BTreeMap<String, InstrumentDoc>,
}

#[derive(Debug, Deserialize)]
struct InstrumentDoc {
    close: f64,
    low: f64,
    prev_close: f64,
    #[serde(default)]
    change_pct: Option<f64>,
    ma_50: f64,
    low_252: f64,
    high_252: f64,
    #[serde(default)]
    trailing_pe: Option<f64>,
    #[serde(default)]
    forward_pe: Option<f64>,
}

impl InstrumentDoc {
    fn into_snapshot(self) -> Result<InstrumentSnapshot, String> {
        let px = |v: f64, field: &str| -> Result<Micros, String> {
            micros_from_f64(v).map_err(|e: PriceError| format!("{field}: {e}"))
        };
        let close = px(self.close, "close")?;
        let low = px(self.low, "low")?;
        if !close.is_positive() || !low.is_positive() {
            return Err(format!("non-positive close/low ({close}/{low})"));
        }
        let prev_close = px(self.prev_close, "prev_close")?;
        Ok(InstrumentSnapshot {
            close,
            low,
            prev_close,
            change_pct: self
                .change_pct
                .unwrap_or_else(|| change_pct(close, prev_close)),
            ma_50: px(self.ma_50, "ma_50")?,
            low_252: px(self.low_252, "low_252")?,
            high_252: px(self.high_252, "high_252")?,
            trailing_pe: self.trailing_pe,
            forward_pe: self.forward_pe,
        })
    }
}

pub fn parse_snapshot_json(src: &str) -> Result<MarketSnapshot> {
    let doc: SnapshotDoc = serde_json::from_str(src).context("parse snapshot json")?;
    let trade_date: NaiveDate = normalize_date(&doc.trade_date)
        .with_context(|| format!("snapshot trade_date is not a date: '{}'", doc.trade_date))?;

    let mut snap = MarketSnapshot::new(trade_date);
    for (symbol, inst) in doc.instruments {
        let symbol = symbol.trim().to_ascii_uppercase();
        match inst.into_snapshot() {
            Ok(s) => {
                snap.instruments.insert(symbol, s);
            }
            Err(reason) => {
                tracing::warn!(symbol = %symbol, %reason, "snapshot instrument dropped");
            }
        }
    }
    Ok(snap)
}

pub fn load_snapshot_json(path: &Path) -> Result<MarketSnapshot> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("read snapshot: {}", path.display()))?;
    parse_snapshot_json(&s)
}
