//! Scenario: CSV ledger store load/flush
//!
//! # Invariants under test
//!
//! 1. `init` writes a flat row per symbol plus the CASH row; `load` reads
//!    them back with the same cash.
//! 2. Fills, pending orders and benchmark rows survive flush + load.
//! 3. Malformed pending rows are preserved verbatim across a flush and are
//!    never typed into pending orders.
//! 4. Loading a directory without `positions.csv` is a `Missing` error, and
//!    `init` refuses to overwrite an existing store.
//! 5. An untyped row keeps its line position across a flush, including when
//!    new rows are appended or earlier pending orders are removed.

use std::collections::BTreeSet;
use std::fs;

use chrono::NaiveDate;
use mrm_ledger::{
    compute_benchmark_row, Micros, OrderId, OrderStatus, PendingOrder, Table, Track,
};
use mrm_store::{CsvLedgerStore, LedgerStore, StoreError};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

fn order(symbol: &str, limit: i64, shares: i64, track: Track) -> PendingOrder {
    PendingOrder {
        id: OrderId::new(),
        date: Some(d(26)),
        symbol: symbol.to_string(),
        limit: Micros::from_dollars(limit),
        shares,
        track,
        signal: "SINGLE-DAY DROP".to_string(),
        thesis: "moat, intact".to_string(),
        notes: String::new(),
        status: OrderStatus::Pending,
    }
}

#[test]
fn init_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvLedgerStore::new(dir.path());
    assert!(!store.exists());

    store
        .init(["VOO", "ROP"], Micros::from_dollars(10_000))
        .unwrap();
    assert!(store.exists());

    let ledger = store.load().unwrap();
    assert_eq!(ledger.cash(), Micros::from_dollars(10_000));
    assert_eq!(ledger.positions().len(), 2);
    assert!(ledger.pending().is_empty());

    let again = store.init(["VOO"], Micros::ZERO);
    assert!(matches!(again, Err(StoreError::AlreadyExists { .. })));
}

#[test]
fn state_survives_flush() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvLedgerStore::new(dir.path());
    let mut ledger = store
        .init(["VOO", "ROP"], Micros::from_dollars(10_000))
        .unwrap();

    let filled = order("ROP", 400, 10, Track::One);
    ledger.record_fill(&filled, d(26)).unwrap();
    ledger.push_pending(order("VOO", 540, 2, Track::Three));
    ledger.mark_price("ROP", Micros::new(402_500_000));
    let row = compute_benchmark_row(&ledger, d(26), Micros::from_dollars(560));
    ledger.append_benchmark(row);
    store.flush(&ledger).unwrap();

    let back = store.load().unwrap();
    assert_eq!(back.cash(), Micros::from_dollars(6_000));
    let rop = back.position("ROP").unwrap();
    assert_eq!(rop.shares, 10);
    assert_eq!(rop.avg_cost(), Micros::from_dollars(400));
    assert_eq!(rop.first_acquired, Some(d(26)));
    assert_eq!(rop.last_price, Some(Micros::new(402_500_000)));

    assert_eq!(back.pending().len(), 1);
    assert_eq!(back.pending()[0].symbol, "VOO");
    assert_eq!(back.pending()[0].track, Track::Three);
    // Quoted comma in a free-text cell survives.
    assert_eq!(back.pending()[0].thesis, "moat, intact");

    assert_eq!(back.action_log().len(), 1);
    assert_eq!(back.action_log()[0].price, Micros::from_dollars(400));
    assert_eq!(back.benchmark().len(), 1);
    assert_eq!(back.benchmark()[0].index_price, Micros::from_dollars(560));
}

#[test]
fn malformed_pending_rows_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvLedgerStore::new(dir.path());
    store.init(["ROP"], Micros::from_dollars(1_000)).unwrap();

    fs::write(
        dir.path().join("pending_orders.csv"),
        "date,symbol,limit,shares,track,signal,thesis,notes,status\n\
         2026-01-26,ROP,400,1,3,,,,PENDING\n\
         2026-01-26,ROP,,5,1,,,,PENDING\n\
         someday,ROP,10,1,1,,,,\n",
    )
    .unwrap();

    let ledger = store.load().unwrap();
    assert_eq!(ledger.pending().len(), 1);
    let raw: Vec<_> = ledger
        .raw_rows()
        .iter()
        .filter(|r| r.table == Table::PendingOrders)
        .collect();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[1].cells[0], "someday");

    store.flush(&ledger).unwrap();
    let text = fs::read_to_string(dir.path().join("pending_orders.csv")).unwrap();
    assert!(text.contains("2026-01-26,ROP,,5,1,,,,PENDING"));
    assert!(text.contains("someday,ROP,10,1,1,,,,"));
    assert_eq!(store.load().unwrap().raw_rows().len(), 2);
}

#[test]
fn missing_store_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvLedgerStore::new(dir.path().join("nope"));
    assert!(matches!(store.load(), Err(StoreError::Missing { .. })));
}

// ---------------------------------------------------------------------------
// Row position
// ---------------------------------------------------------------------------

fn line_of(text: &str, needle: &str) -> Option<usize> {
    text.lines().position(|l| l.starts_with(needle))
}

#[test]
fn untyped_log_row_keeps_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvLedgerStore::new(dir.path());
    store.init(["ROP"], Micros::from_dollars(1_000)).unwrap();

    let path = dir.path().join("action_log.csv");
    fs::write(
        &path,
        "date,symbol,track,action,shares,price,signal,thesis,notes\n\
         2026-01-20,ROP,1,BUY,1,400,,,\n\
         BADDATE,ROP,1,BUY,1,401,,,\n\
         2026-01-22,ROP,1,BUY,1,402,,,\n",
    )
    .unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let mut ledger = store.load().unwrap();
    assert_eq!(ledger.action_log().len(), 2);
    store.flush(&ledger).unwrap();
    let after = fs::read_to_string(&path).unwrap();
    assert_eq!(line_of(&before, "BADDATE"), Some(2));
    assert_eq!(line_of(&after, "BADDATE"), Some(2));

    // A new fill appends after the untyped row, never ahead of it.
    ledger
        .record_fill(&order("ROP", 90, 1, Track::Three), d(26))
        .unwrap();
    store.flush(&ledger).unwrap();
    let after = fs::read_to_string(&path).unwrap();
    assert_eq!(line_of(&after, "BADDATE"), Some(2));
    assert_eq!(line_of(&after, "2026-01-26"), Some(4));
}

#[test]
fn untyped_pending_row_follows_removed_neighbour() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvLedgerStore::new(dir.path());
    store.init(["ROP", "VOO"], Micros::from_dollars(1_000)).unwrap();

    let path = dir.path().join("pending_orders.csv");
    fs::write(
        &path,
        "date,symbol,limit,shares,track,signal,thesis,notes,status\n\
         2026-01-26,ROP,400,1,3,,,,PENDING\n\
         someday,ROP,10,1,1,,,,\n\
         2026-01-26,VOO,540,1,3,,,,PENDING\n",
    )
    .unwrap();

    let mut ledger = store.load().unwrap();
    let first = ledger.pending()[0].id;
    ledger.remove_pending(&BTreeSet::from([first]));
    store.flush(&ledger).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(line_of(&text, "someday"), Some(1));
    assert_eq!(line_of(&text, "2026-01-26,VOO"), Some(2));
    assert_eq!(line_of(&text, "2026-01-26,ROP"), None);
}
