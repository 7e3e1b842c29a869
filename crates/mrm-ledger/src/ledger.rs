//! In-memory ledger for one batch.
//!
//! # Purpose
//! The store loads tables into a [`Ledger`]; the reconciler and ingestor
//! mutate it through a narrow write surface; the store flushes it back.
//! Between load and flush nothing else touches durable state.
//!
//! The write surface enforces the cash invariant: [`Ledger::record_fill`]
//! refuses any fill whose cost exceeds the current balance, so cash never
//! goes negative as the result of a fill.
//!
//! # Determinism
//! Positions are a `BTreeMap` keyed by symbol; pending orders, action log
//! and benchmark rows keep their stored order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::accounting::{apply_buy, Fill};
use crate::key::OrderKey;
use crate::types::{
    ActionKind, ActionLogEntry, BenchmarkRow, OrderId, PendingOrder, Position, RawRow, Table,
};
use crate::Micros;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Share count must be strictly positive.
    NonPositiveShares { shares: i64 },
    /// Fill price must be strictly positive.
    NonPositivePrice { price: Micros },
    EmptySymbol,
    /// Fill cost exceeds the cash balance.
    InsufficientCash { required: Micros, available: Micros },
    /// shares × price does not fit in `i64` micros.
    CostOverflow { shares: i64, price: Micros },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveShares { shares } => {
                write!(f, "ledger invariant: shares must be > 0, got {shares}")
            }
            Self::NonPositivePrice { price } => {
                write!(f, "ledger invariant: price must be > 0, got {price}")
            }
            Self::EmptySymbol => write!(f, "ledger invariant: symbol must not be empty"),
            Self::InsufficientCash {
                required,
                available,
            } => write!(
                f,
                "ledger invariant: fill needs ${required} but only ${available} cash"
            ),
            Self::CostOverflow { shares, price } => {
                write!(f, "ledger invariant: {shares} x ${price} overflows")
            }
        }
    }
}

impl std::error::Error for LedgerError {}

// ---------------------------------------------------------------------------
// Snapshot (read-only view)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub cash: Micros,
    pub positions: BTreeMap<String, Position>,
    pub pending_count: usize,
    pub action_log_count: usize,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    cash: Micros,
    positions: BTreeMap<String, Position>,
    pending: Vec<PendingOrder>,
    action_log: Vec<ActionLogEntry>,
    benchmark: Vec<BenchmarkRow>,
    raw_rows: Vec<RawRow>,
}

impl Ledger {
    pub fn new(cash: Micros) -> Self {
        Self {
            cash,
            ..Self::default()
        }
    }

    /// A ledger with a flat position row per symbol.
    pub fn with_symbols<I, S>(symbols: I, cash: Micros) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = Self::new(cash);
        for sym in symbols {
            let sym = sym.into();
            ledger.positions.insert(sym.clone(), Position::flat(sym));
        }
        ledger
    }

    // -----------------------------------------------------------------------
    // Load surface (store only)
    // -----------------------------------------------------------------------

    pub fn set_cash(&mut self, cash: Micros) {
        self.cash = cash;
    }

    pub fn insert_position(&mut self, position: Position) {
        self.positions.insert(position.symbol.clone(), position);
    }

    pub fn push_log_entry(&mut self, entry: ActionLogEntry) {
        self.action_log.push(entry);
    }

    /// Keep an untyped row, anchored after the typed rows of `table` loaded
    /// so far.
    pub fn push_raw_row(&mut self, table: Table, cells: Vec<String>, reason: String) {
        let after = match table {
            Table::PendingOrders => self.pending.len(),
            Table::ActionLog => self.action_log.len(),
            Table::Benchmark => self.benchmark.len(),
        };
        self.raw_rows.push(RawRow {
            table,
            after,
            cells,
            reason,
        });
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Append a pending order (store load or an accepted decision).
    pub fn push_pending(&mut self, order: PendingOrder) {
        self.pending.push(order);
    }

    /// Execute `order` at its limit on `date`: debit cash, update the
    /// position, append a BUY action-log entry.
    ///
    /// # Errors
    /// [`LedgerError::InsufficientCash`] when the cost exceeds the balance.
    /// The ledger is **not** mutated on error.
    pub fn record_fill(
        &mut self,
        order: &PendingOrder,
        date: NaiveDate,
    ) -> Result<ActionLogEntry, LedgerError> {
        if order.symbol.trim().is_empty() {
            return Err(LedgerError::EmptySymbol);
        }
        if order.shares <= 0 {
            return Err(LedgerError::NonPositiveShares {
                shares: order.shares,
            });
        }
        if !order.limit.is_positive() {
            return Err(LedgerError::NonPositivePrice { price: order.limit });
        }

        let fill = Fill::new(order.symbol.clone(), order.shares, order.limit, date);
        let cost = fill.cost()?;
        if cost > self.cash {
            return Err(LedgerError::InsufficientCash {
                required: cost,
                available: self.cash,
            });
        }

        let pos = self
            .positions
            .entry(order.symbol.clone())
            .or_insert_with(|| Position::flat(order.symbol.clone()));
        apply_buy(pos, &fill)?;
        self.cash -= cost;

        let entry = ActionLogEntry {
            date,
            symbol: order.symbol.clone(),
            track: order.track,
            action: ActionKind::Buy,
            shares: order.shares,
            price: order.limit,
            signal: order.signal.clone(),
            thesis: order.thesis.clone(),
            notes: order.notes.clone(),
        };
        self.action_log.push(entry.clone());
        Ok(entry)
    }

    /// Remove pending orders by id, preserving the order of survivors.
    /// Returns the number removed.
    /// Untyped pending rows keep their place relative to the survivors.
    pub fn remove_pending(&mut self, ids: &BTreeSet<OrderId>) -> usize {
        for raw in self
            .raw_rows
            .iter_mut()
            .filter(|r| r.table == Table::PendingOrders)
        {
            let end = raw.after.min(self.pending.len());
            raw.after = self.pending[..end]
                .iter()
                .filter(|o| !ids.contains(&o.id))
                .count();
        }
        let before = self.pending.len();
        self.pending.retain(|o| !ids.contains(&o.id));
        before - self.pending.len()
    }

    /// Mark a position to `price`. Returns `false` for unknown symbols.
    pub fn mark_price(&mut self, symbol: &str, price: Micros) -> bool {
        match self.positions.get_mut(symbol) {
            Some(pos) => {
                pos.last_price = Some(price);
                true
            }
            None => false,
        }
    }

    pub fn append_benchmark(&mut self, row: BenchmarkRow) {
        self.benchmark.push(row);
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    pub fn cash(&self) -> Micros {
        self.cash
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    pub fn pending(&self) -> &[PendingOrder] {
        &self.pending
    }

    pub fn action_log(&self) -> &[ActionLogEntry] {
        &self.action_log
    }

    pub fn benchmark(&self) -> &[BenchmarkRow] {
        &self.benchmark
    }

    pub fn raw_rows(&self) -> &[RawRow] {
        &self.raw_rows
    }

    /// `true` if a pending order or an action-log entry carries `key`.
    pub fn contains_key(&self, key: &OrderKey) -> bool {
        self.pending.iter().any(|o| &OrderKey::of_pending(o) == key)
            || self
                .action_log
                .iter()
                .any(|e| &OrderKey::of_log_entry(e) == key)
    }

    /// Σ(shares × last price) + cash. Unmarked positions count as zero.
    pub fn portfolio_value(&self) -> Micros {
        self.positions
            .values()
            .map(Position::market_value)
            .fold(self.cash, Micros::saturating_add)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cash: self.cash,
            positions: self.positions.clone(),
            pending_count: self.pending.len(),
            action_log_count: self.action_log.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, Track};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn order(symbol: &str, limit: i64, shares: i64) -> PendingOrder {
        PendingOrder {
            id: OrderId::new(),
            date: Some(d(5)),
            symbol: symbol.to_string(),
            limit: Micros::from_dollars(limit),
            shares,
            track: Track::One,
            signal: "dip".to_string(),
            thesis: String::new(),
            notes: String::new(),
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn fill_debits_cash_and_logs_buy() {
        let mut l = Ledger::with_symbols(["X"], Micros::from_dollars(10_000));
        let entry = l.record_fill(&order("X", 96, 10), d(5)).unwrap();

        assert_eq!(l.cash(), Micros::from_dollars(9_040));
        assert_eq!(entry.price, Micros::from_dollars(96));
        assert_eq!(entry.action, ActionKind::Buy);
        assert_eq!(l.action_log().len(), 1);
        let pos = l.position("X").unwrap();
        assert_eq!(pos.shares, 10);
        assert_eq!(pos.avg_cost(), Micros::from_dollars(96));
    }

    #[test]
    fn insufficient_cash_is_rejected_without_mutation() {
        let mut l = Ledger::with_symbols(["X"], Micros::from_dollars(500));
        let err = l.record_fill(&order("X", 96, 10), d(5));
        assert_eq!(
            err,
            Err(LedgerError::InsufficientCash {
                required: Micros::from_dollars(960),
                available: Micros::from_dollars(500),
            })
        );
        assert_eq!(l.cash(), Micros::from_dollars(500));
        assert!(l.action_log().is_empty());
        assert_eq!(l.position("X").unwrap().shares, 0);
    }

    #[test]
    fn exact_cash_fills_to_zero() {
        let mut l = Ledger::new(Micros::from_dollars(960));
        l.record_fill(&order("X", 96, 10), d(5)).unwrap();
        assert_eq!(l.cash(), Micros::ZERO);
        // Position is created on demand for a symbol without a row.
        assert_eq!(l.position("X").unwrap().shares, 10);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let mut l = Ledger::new(Micros::from_dollars(1_000));
        assert_eq!(
            l.record_fill(&order("X", 96, 0), d(5)),
            Err(LedgerError::NonPositiveShares { shares: 0 })
        );
        assert_eq!(
            l.record_fill(&order("X", 0, 1), d(5)),
            Err(LedgerError::NonPositivePrice {
                price: Micros::ZERO
            })
        );
        assert_eq!(
            l.record_fill(&order(" ", 1, 1), d(5)),
            Err(LedgerError::EmptySymbol)
        );
    }

    #[test]
    fn remove_pending_preserves_survivor_order() {
        let mut l = Ledger::new(Micros::ZERO);
        let (a, b, c) = (order("A", 1, 1), order("B", 1, 1), order("C", 1, 1));
        let drop_id = b.id;
        l.push_pending(a);
        l.push_pending(b);
        l.push_pending(c);

        let removed = l.remove_pending(&BTreeSet::from([drop_id]));
        assert_eq!(removed, 1);
        let syms: Vec<&str> = l.pending().iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(syms, vec!["A", "C"]);
    }

    #[test]
    fn raw_pending_row_keeps_its_slot_when_earlier_orders_leave() {
        let mut l = Ledger::new(Micros::ZERO);
        let (a, b) = (order("A", 1, 1), order("B", 1, 1));
        let drop_id = a.id;
        l.push_pending(a);
        l.push_raw_row(Table::PendingOrders, vec!["bad".to_string()], "bad date".to_string());
        l.push_pending(b);
        l.push_raw_row(Table::ActionLog, vec!["x".to_string()], "bad date".to_string());
        assert_eq!(l.raw_rows()[0].after, 1);

        l.remove_pending(&BTreeSet::from([drop_id]));
        // Now sits ahead of B, the first survivor.
        assert_eq!(l.raw_rows()[0].after, 0);
        assert_eq!(l.raw_rows()[1].after, 0);
    }

    #[test]
    fn contains_key_sees_pending_and_log() {
        let mut l = Ledger::new(Micros::from_dollars(1_000));
        let o = order("X", 96, 1);
        l.push_pending(o.clone());
        assert!(l.contains_key(&OrderKey::of_pending(&o)));

        let filled = order("Y", 50, 2);
        let entry = l.record_fill(&filled, d(7)).unwrap();
        assert!(l.contains_key(&OrderKey::of_log_entry(&entry)));
        assert!(!l.contains_key(&OrderKey::new(
            Some(d(8)),
            "Y",
            Track::One,
            Micros::from_dollars(50),
            2
        )));
    }

    #[test]
    fn portfolio_value_counts_marked_positions_and_cash() {
        let mut l = Ledger::with_symbols(["X", "Y"], Micros::from_dollars(1_000));
        l.record_fill(&order("X", 10, 10), d(5)).unwrap();
        assert!(l.mark_price("X", Micros::from_dollars(12)));
        assert!(!l.mark_price("Z", Micros::from_dollars(1)));
        // cash 900 + 10 * 12
        assert_eq!(l.portfolio_value(), Micros::from_dollars(1_020));
    }
}
