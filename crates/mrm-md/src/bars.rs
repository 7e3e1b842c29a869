//! Daily bar CSV adapter and snapshot derivation.
//!
//! ## CSV column contract (header required, order-independent)
//!
//! | Column   | Example      | Notes                        |
//! |----------|--------------|------------------------------|
//! | `symbol` | `ROP`        | upper-cased on read          |
//! | `date`   | `2026-01-26` | any form `normalize_date` accepts |
//! | `open`   | `401.20`     | decimal string, no floats    |
//! | `high`   | `405.00`     |                              |
//! | `low`    | `398.10`     |                              |
//! | `close`  | `402.55`     |                              |
//! | `volume` | `1200000`    | optional                     |
//!
//! Unparseable rows are rejected with a reason and never abort the file.
//!
//! ## Derivation (per symbol, bars sorted by date, duplicate dates: last wins)
//!
//! - needs at least 2 bars, otherwise the symbol is left out
//! - close / low from the last bar, prev_close from the one before
//! - ma_50: mean close of the last 50 bars (all bars if fewer)
//! - low_252 / high_252: min low / max high over the last 252 bars
//! - trade date: most common last-bar date across symbols; ties go to the
//!   latest date

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mrm_ledger::{dates::normalize_date, parse_micros, Micros};
use serde::Deserialize;

use crate::{change_pct, InstrumentSnapshot, MarketSnapshot};

const MA_WINDOW: usize = 50;
const RANGE_WINDOW: usize = 252;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Micros,
    pub high: Micros,
    pub low: Micros,
    pub close: Micros,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedBars {
    pub bars: Vec<DailyBar>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    symbol: String,
    date: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: String,
}

impl BarRecord {
    fn into_bar(self) -> Result<DailyBar, String> {
        let symbol = self.symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err("empty symbol".to_string());
        }
        let date = normalize_date(&self.date).ok_or_else(|| format!("bad date '{}'", self.date))?;
        let px = |raw: &str, field: &str| {
            parse_micros(raw).map_err(|e| format!("{field}: {e}"))
        };
        let open = px(&self.open, "open")?;
        let high = px(&self.high, "high")?;
        let low = px(&self.low, "low")?;
        let close = px(&self.close, "close")?;
        if !close.is_positive() || !low.is_positive() || high < low {
            return Err(format!("inconsistent OHLC (low {low}, high {high}, close {close})"));
        }
        let volume = if self.volume.trim().is_empty() {
            0
        } else {
            self.volume
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("bad volume '{}'", self.volume))?
        };
        Ok(DailyBar {
            symbol,
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

pub fn parse_bars_csv_str(src: &str) -> Result<ParsedBars> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let mut out = ParsedBars::default();
    for (i, rec) in rdr.deserialize::<BarRecord>().enumerate() {
        let row = i + 1;
        let rec = match rec {
            Ok(r) => r,
            Err(e) if e.is_io_error() => {
                return Err(e).context("read bars csv");
            }
            Err(e) => {
                out.rejected.push(RejectedRow {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match rec.into_bar() {
            Ok(bar) => out.bars.push(bar),
            Err(reason) => out.rejected.push(RejectedRow { row, reason }),
        }
    }

    if !out.rejected.is_empty() {
        tracing::warn!(rejected = out.rejected.len(), "bar rows rejected");
    }
    Ok(out)
}

pub fn load_bars_csv(path: &Path) -> Result<ParsedBars> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("open bars csv: {}", path.display()))?;
    parse_bars_csv_str(&s)
}

fn mean(values: &[Micros]) -> Micros {
    if values.is_empty() {
        return Micros::ZERO;
    }
    let total: i128 = values.iter().map(|m| m.raw() as i128).sum();
    Micros::new((total / values.len() as i128) as i64)
}

fn tail<T>(v: &[T], n: usize) -> &[T] {
    &v[v.len().saturating_sub(n)..]
}

/// Derive one instrument's snapshot from its date-sorted bars.
pub fn derive_instrument(bars: &[DailyBar]) -> Option<InstrumentSnapshot> {
    if bars.len() < 2 {
        return None;
    }
    let last = &bars[bars.len() - 1];
    let prev = &bars[bars.len() - 2];

    let closes: Vec<Micros> = tail(bars, MA_WINDOW).iter().map(|b| b.close).collect();
    let window = tail(bars, RANGE_WINDOW);
    let low_252 = window.iter().map(|b| b.low).min()?;
    let high_252 = window.iter().map(|b| b.high).max()?;

    Some(InstrumentSnapshot {
        close: last.close,
        low: last.low,
        prev_close: prev.close,
        change_pct: change_pct(last.close, prev.close),
        ma_50: mean(&closes),
        low_252,
        high_252,
        trailing_pe: None,
        forward_pe: None,
    })
}

/// Build a snapshot from a bar history. `None` when no symbol has enough
/// bars.
pub fn derive_snapshot(bars: &[DailyBar]) -> Option<MarketSnapshot> {
    let mut by_symbol: BTreeMap<&str, BTreeMap<NaiveDate, &DailyBar>> = BTreeMap::new();
    for bar in bars {
        by_symbol
            .entry(bar.symbol.as_str())
            .or_default()
            .insert(bar.date, bar);
    }

    let mut instruments = BTreeMap::new();
    let mut last_dates: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (symbol, dated) in by_symbol {
        let series: Vec<DailyBar> = dated.values().map(|b| (*b).clone()).collect();
        match derive_instrument(&series) {
            Some(inst) => {
                if let Some(last) = series.last() {
                    *last_dates.entry(last.date).or_default() += 1;
                }
                instruments.insert(symbol.to_string(), inst);
            }
            None => tracing::warn!(symbol, bars = series.len(), "not enough bars; skipped"),
        }
    }

    // BTreeMap iterates dates ascending, so max_by_key keeps the latest on ties.
    let trade_date = last_dates
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(date, _)| *date)?;

    Some(MarketSnapshot {
        trade_date,
        instruments,
    })
}
