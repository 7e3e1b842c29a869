//! Scenario: reconciliation partitions every evaluable order
//!
//! # Invariants under test
//!
//! 1. Every PENDING, non-future-dated order with market data lands in
//!    exactly one of fill / expire / keep; everything else is skipped.
//! 2. Cash is never negative after reconciliation, and equals the starting
//!    cash minus the cost of all fills.
//! 3. Exactly the filled and expired orders leave the ledger.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use mrm_ledger::{Ledger, Micros, OrderId, OrderStatus, PendingOrder, Track};
use mrm_md::{InstrumentSnapshot, MarketSnapshot};
use mrm_reconcile::reconcile_orders;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

fn inst(low: i64) -> InstrumentSnapshot {
    InstrumentSnapshot {
        close: Micros::from_dollars(low),
        low: Micros::from_dollars(low),
        prev_close: Micros::from_dollars(low),
        change_pct: 0.0,
        ma_50: Micros::from_dollars(low),
        low_252: Micros::from_dollars(low),
        high_252: Micros::from_dollars(low),
        trailing_pe: None,
        forward_pe: None,
    }
}

/// Deterministic mixed book: every combination of symbol, limit, track and
/// date offset.
fn book() -> Vec<PendingOrder> {
    let mut out = Vec::new();
    let tracks = [Track::One, Track::Two, Track::Three];
    let dates = [None, Some(d(20)), Some(d(26)), Some(d(28))];
    for (si, symbol) in ["A", "B", "Z"].iter().enumerate() {
        for limit in [40_i64, 50, 60] {
            for track in tracks {
                for date in dates {
                    out.push(PendingOrder {
                        id: OrderId::new(),
                        date,
                        symbol: symbol.to_string(),
                        limit: Micros::from_dollars(limit),
                        shares: 3 + si as i64,
                        track,
                        signal: String::new(),
                        thesis: String::new(),
                        notes: String::new(),
                        status: OrderStatus::Pending,
                    });
                }
            }
        }
    }
    out
}

#[test]
fn outcomes_are_a_partition() {
    let orders = book();
    let mut ledger = Ledger::new(Micros::from_dollars(2_000));
    for o in &orders {
        ledger.push_pending(o.clone());
    }
    let market = MarketSnapshot::new(d(26))
        .with_instrument("A", inst(50))
        .with_instrument("B", inst(55));

    let cash_before = ledger.cash();
    let report = reconcile_orders(&mut ledger, &market);

    // Every order appears exactly once across the four buckets.
    let mut seen: BTreeSet<OrderId> = BTreeSet::new();
    let ids = report
        .fills
        .iter()
        .map(|f| f.order_id)
        .chain(report.expirations.iter().map(|e| e.order_id))
        .chain(report.kept.iter().map(|k| k.order_id))
        .chain(report.skipped.iter().filter_map(|s| s.order_id));
    for id in ids {
        assert!(seen.insert(id), "order {id} reported twice");
    }
    assert_eq!(seen.len(), orders.len());

    // Evaluable = priced symbol and not future-dated.
    let evaluable = orders
        .iter()
        .filter(|o| o.symbol != "Z" && o.date != Some(d(28)))
        .count();
    assert_eq!(report.evaluated(), evaluable);

    assert!(!ledger.cash().is_negative());
    assert_eq!(ledger.cash(), cash_before - report.spent());

    let removed = report.fills.len() + report.expirations.len();
    assert_eq!(ledger.pending().len(), orders.len() - removed);
    assert!(!report.fills.is_empty());
    assert!(report.blocked().count() > 0);
}
