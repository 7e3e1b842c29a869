use std::fs;
use std::path::{Path, PathBuf};

use mrm_ledger::dates::{format_date, normalize_date};
use mrm_ledger::{
    parse_micros, ActionKind, ActionLogEntry, BenchmarkRow, Ledger, Micros, OrderId,
    OrderStatus, PendingOrder, Position, PriceError, RawRow, Table, Track, CASH_SYMBOL,
};
use serde::de::DeserializeOwned;

use crate::records::{
    ActionLogRecord, BenchmarkRecord, PendingRecord, PositionRecord, ACTION_LOG_FILE,
    BENCHMARK_FILE, PENDING_FILE, POSITIONS_FILE,
};
use crate::{LedgerStore, StoreError};

const POSITIONS_HEADER: [&str; 6] = [
    "symbol",
    "shares",
    "avg_cost",
    "current_price",
    "cash",
    "first_buy_date",
];
const PENDING_HEADER: [&str; 9] = [
    "date", "symbol", "limit", "shares", "track", "signal", "thesis", "notes", "status",
];
const ACTION_LOG_HEADER: [&str; 9] = [
    "date", "symbol", "track", "action", "shares", "price", "signal", "thesis", "notes",
];
const BENCHMARK_HEADER: [&str; 6] = [
    "date",
    "index_price",
    "portfolio_value",
    "index_return",
    "portfolio_return",
    "alpha",
];

/// One CSV file per ledger table under `dir`.
#[derive(Debug, Clone)]
pub struct CsvLedgerStore {
    dir: PathBuf,
}

impl CsvLedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Create a fresh store: a flat row per symbol, the cash row, and empty
    /// order/log/benchmark tables.
    pub fn init<I, S>(&self, symbols: I, cash: Micros) -> Result<Ledger, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.exists() {
            return Err(StoreError::AlreadyExists {
                path: self.path(POSITIONS_FILE),
            });
        }
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            path: self.dir.clone(),
            message: e.to_string(),
        })?;
        let ledger = Ledger::with_symbols(symbols, cash);
        self.flush(&ledger)?;
        tracing::info!(dir = %self.dir.display(), cash = %cash, "ledger store initialised");
        Ok(ledger)
    }
}

impl LedgerStore for CsvLedgerStore {
    fn exists(&self) -> bool {
        self.path(POSITIONS_FILE).is_file()
    }

    fn load(&self) -> Result<Ledger, StoreError> {
        let positions_path = self.path(POSITIONS_FILE);
        if !positions_path.is_file() {
            return Err(StoreError::Missing {
                path: positions_path,
            });
        }

        let mut ledger = Ledger::new(Micros::ZERO);

        for (row, rec) in read_records::<PositionRecord>(&positions_path)?
            .into_iter()
            .enumerate()
        {
            load_position_row(&mut ledger, rec).map_err(|reason| StoreError::Malformed {
                path: positions_path.clone(),
                row: row + 1,
                reason,
            })?;
        }

        let pending_path = self.path(PENDING_FILE);
        for rec in read_optional::<PendingRecord>(&pending_path)? {
            match type_pending(&rec) {
                Ok(order) => ledger.push_pending(order),
                Err(reason) => {
                    tracing::warn!(%reason, symbol = %rec.symbol, "pending row kept unevaluated");
                    ledger.push_raw_row(Table::PendingOrders, rec.into_cells(), reason);
                }
            }
        }

        let log_path = self.path(ACTION_LOG_FILE);
        for rec in read_optional::<ActionLogRecord>(&log_path)? {
            match type_log_entry(&rec) {
                Ok(entry) => ledger.push_log_entry(entry),
                Err(reason) => {
                    tracing::warn!(%reason, symbol = %rec.symbol, "action log row kept untyped");
                    ledger.push_raw_row(Table::ActionLog, rec.into_cells(), reason);
                }
            }
        }

        let bench_path = self.path(BENCHMARK_FILE);
        for rec in read_optional::<BenchmarkRecord>(&bench_path)? {
            match type_benchmark(&rec) {
                Ok(row) => ledger.append_benchmark(row),
                Err(reason) => {
                    tracing::warn!(%reason, date = %rec.date, "benchmark row kept untyped");
                    let cells = vec![
                        rec.date,
                        rec.index_price,
                        rec.portfolio_value,
                        rec.index_return,
                        rec.portfolio_return,
                        rec.alpha,
                    ];
                    ledger.push_raw_row(Table::Benchmark, cells, reason);
                }
            }
        }

        tracing::debug!(
            positions = ledger.positions().len(),
            pending = ledger.pending().len(),
            action_log = ledger.action_log().len(),
            raw_rows = ledger.raw_rows().len(),
            cash = %ledger.cash(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    fn flush(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let mut positions: Vec<Vec<String>> = ledger
            .positions()
            .values()
            .map(|p| {
                vec![
                    p.symbol.clone(),
                    p.shares.to_string(),
                    p.avg_cost().to_string(),
                    p.last_price.map(|m| m.to_string()).unwrap_or_default(),
                    String::new(),
                    p.first_acquired.map(format_date).unwrap_or_default(),
                ]
            })
            .collect();
        positions.push(vec![
            CASH_SYMBOL.to_string(),
            String::new(),
            String::new(),
            String::new(),
            ledger.cash().to_string(),
            String::new(),
        ]);
        write_table(&self.path(POSITIONS_FILE), &POSITIONS_HEADER, positions)?;

        let pending = interleave(
            ledger.pending().iter().map(pending_cells).collect(),
            ledger.raw_rows(),
            Table::PendingOrders,
        );
        write_table(&self.path(PENDING_FILE), &PENDING_HEADER, pending)?;

        let log = interleave(
            ledger.action_log().iter().map(log_cells).collect(),
            ledger.raw_rows(),
            Table::ActionLog,
        );
        write_table(&self.path(ACTION_LOG_FILE), &ACTION_LOG_HEADER, log)?;

        let bench = interleave(
            ledger.benchmark().iter().map(benchmark_cells).collect(),
            ledger.raw_rows(),
            Table::Benchmark,
        );
        write_table(&self.path(BENCHMARK_FILE), &BENCHMARK_HEADER, bench)?;

        tracing::debug!(dir = %self.dir.display(), "ledger flushed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Money cell; tolerates `$` and thousands separators from hand edits.
fn parse_money(raw: &str) -> Result<Micros, PriceError> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    parse_micros(&cleaned)
}

fn parse_money_or_zero(raw: &str, field: &str) -> Result<Micros, String> {
    if raw.trim().is_empty() {
        return Ok(Micros::ZERO);
    }
    parse_money(raw).map_err(|e| format!("{field}: {e}"))
}

/// Share count; accepts `10` and spreadsheet-style `10.0`.
fn parse_shares(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f: f64 = raw.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn load_position_row(ledger: &mut Ledger, rec: PositionRecord) -> Result<(), String> {
    let symbol = rec.symbol.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err("empty symbol".to_string());
    }
    if symbol == CASH_SYMBOL {
        ledger.set_cash(parse_money_or_zero(&rec.cash, "cash")?);
        return Ok(());
    }

    let shares = if rec.shares.trim().is_empty() {
        0
    } else {
        parse_shares(&rec.shares).ok_or_else(|| format!("bad shares '{}'", rec.shares))?
    };
    if shares < 0 {
        return Err(format!("negative shares {shares}"));
    }
    let avg_cost = parse_money_or_zero(&rec.avg_cost, "avg_cost")?;
    let invested = avg_cost
        .checked_mul_qty(shares)
        .ok_or_else(|| format!("{shares} x {avg_cost} overflows"))?;
    let last_price = if rec.current_price.trim().is_empty() {
        None
    } else {
        Some(parse_money_or_zero(&rec.current_price, "current_price")?)
    };

    ledger.insert_position(Position {
        symbol,
        shares,
        invested,
        first_acquired: normalize_date(&rec.first_buy_date),
        last_price,
    });
    Ok(())
}

fn type_pending(rec: &PendingRecord) -> Result<PendingOrder, String> {
    let symbol = rec.symbol.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err("missing symbol".to_string());
    }
    let limit = parse_money(&rec.limit).map_err(|e| format!("limit: {e}"))?;
    if !limit.is_positive() {
        return Err(format!("limit must be > 0, got {limit}"));
    }
    let shares =
        parse_shares(&rec.shares).ok_or_else(|| format!("bad shares '{}'", rec.shares))?;
    if shares < 1 {
        return Err(format!("shares must be >= 1, got {shares}"));
    }
    let track = Track::parse(&rec.track).ok_or_else(|| format!("unknown track '{}'", rec.track))?;
    let date = if rec.date.trim().is_empty() {
        None
    } else {
        Some(normalize_date(&rec.date).ok_or_else(|| format!("bad date '{}'", rec.date))?)
    };

    Ok(PendingOrder {
        id: OrderId::new(),
        date,
        symbol,
        limit,
        shares,
        track,
        signal: rec.signal.clone(),
        thesis: rec.thesis.clone(),
        notes: rec.notes.clone(),
        status: OrderStatus::parse(&rec.status),
    })
}

fn type_log_entry(rec: &ActionLogRecord) -> Result<ActionLogEntry, String> {
    let date = normalize_date(&rec.date).ok_or_else(|| format!("bad date '{}'", rec.date))?;
    let symbol = rec.symbol.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err("missing symbol".to_string());
    }
    let track = Track::parse(&rec.track).ok_or_else(|| format!("unknown track '{}'", rec.track))?;
    let action =
        ActionKind::parse(&rec.action).ok_or_else(|| format!("unknown action '{}'", rec.action))?;
    let shares =
        parse_shares(&rec.shares).ok_or_else(|| format!("bad shares '{}'", rec.shares))?;
    let price = parse_money(&rec.price).map_err(|e| format!("price: {e}"))?;

    Ok(ActionLogEntry {
        date,
        symbol,
        track,
        action,
        shares,
        price,
        signal: rec.signal.clone(),
        thesis: rec.thesis.clone(),
        notes: rec.notes.clone(),
    })
}

fn type_benchmark(rec: &BenchmarkRecord) -> Result<BenchmarkRow, String> {
    let ratio = |raw: &str, field: &str| -> Result<f64, String> {
        if raw.trim().is_empty() {
            return Ok(0.0);
        }
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("bad {field} '{raw}'"))
    };
    Ok(BenchmarkRow {
        date: normalize_date(&rec.date).ok_or_else(|| format!("bad date '{}'", rec.date))?,
        index_price: parse_money_or_zero(&rec.index_price, "index_price")?,
        portfolio_value: parse_money_or_zero(&rec.portfolio_value, "portfolio_value")?,
        index_return: ratio(&rec.index_return, "index_return")?,
        portfolio_return: ratio(&rec.portfolio_return, "portfolio_return")?,
        alpha: ratio(&rec.alpha, "alpha")?,
    })
}

// ---------------------------------------------------------------------------
// Cell rendering
// ---------------------------------------------------------------------------

fn pending_cells(o: &PendingOrder) -> Vec<String> {
    PendingRecord {
        date: o.date.map(format_date).unwrap_or_default(),
        symbol: o.symbol.clone(),
        limit: o.limit.to_string(),
        shares: o.shares.to_string(),
        track: o.track.to_string(),
        signal: o.signal.clone(),
        thesis: o.thesis.clone(),
        notes: o.notes.clone(),
        status: o.status.as_str().to_string(),
    }
    .into_cells()
}

fn log_cells(e: &ActionLogEntry) -> Vec<String> {
    ActionLogRecord {
        date: format_date(e.date),
        symbol: e.symbol.clone(),
        track: e.track.to_string(),
        action: e.action.as_str().to_string(),
        shares: e.shares.to_string(),
        price: e.price.to_string(),
        signal: e.signal.clone(),
        thesis: e.thesis.clone(),
        notes: e.notes.clone(),
    }
    .into_cells()
}

fn benchmark_cells(r: &BenchmarkRow) -> Vec<String> {
    vec![
        format_date(r.date),
        r.index_price.to_string(),
        r.portfolio_value.to_string(),
        format!("{:.6}", r.index_return),
        format!("{:.6}", r.portfolio_return),
        format!("{:.6}", r.alpha),
    ]
}

/// Put each untyped row of `table` back after the typed rows it followed on
/// load. Anchors past the end (rows removed since) land at the end.
fn interleave(typed: Vec<Vec<String>>, raw: &[RawRow], table: Table) -> Vec<Vec<String>> {
    let mut raw = raw.iter().filter(|r| r.table == table).peekable();
    let mut out = Vec::with_capacity(typed.len());
    for (i, row) in typed.into_iter().enumerate() {
        while let Some(r) = raw.next_if(|r| r.after <= i) {
            out.push(r.cells.clone());
        }
        out.push(row);
    }
    out.extend(raw.map(|r| r.cells.clone()));
    out
}

// ---------------------------------------------------------------------------
// File IO
// ---------------------------------------------------------------------------

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let csv_err = |e: csv::Error| StoreError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let mut out = Vec::new();
    for rec in rdr.deserialize::<T>() {
        out.push(rec.map_err(csv_err)?);
    }
    Ok(out)
}

/// Optional tables read as empty when the file does not exist.
fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    read_records(path)
}

/// Write `rows` under `header`, replacing `path` via a temp file + rename.
fn write_table(path: &Path, header: &[&str], rows: Vec<Vec<String>>) -> Result<(), StoreError> {
    let tmp = path.with_extension("csv.tmp");
    let csv_err = |e: csv::Error| StoreError::Csv {
        path: tmp.clone(),
        message: e.to_string(),
    };

    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&tmp)
        .map_err(csv_err)?;
    wtr.write_record(header).map_err(csv_err)?;
    for row in rows {
        wtr.write_record(&row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| StoreError::Io {
        path: tmp.clone(),
        message: e.to_string(),
    })?;
    drop(wtr);

    fs::rename(&tmp, path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
