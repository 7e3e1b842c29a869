//! Scenario: weighted-average cost is order-invariant
//!
//! # Invariants under test
//!
//! 1. Applying the same set of buys in any order yields identical share
//!    count, invested capital and average cost.
//!
//! 2. Average cost equals Σ(shares × price) / Σ shares for fractional prices
//!    (no per-fill rounding drift).
//!
//! 3. The first-acquisition date is the date of the first fill applied and
//!    never moves afterwards.
//!
//! All tests are pure; no IO.

use chrono::NaiveDate;
use mrm_ledger::{
    Ledger, Micros, OrderId, OrderStatus, PendingOrder, Position, Track, MICROS_SCALE,
};

const M: i64 = MICROS_SCALE;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
}

fn buy(shares: i64, limit_micros: i64) -> PendingOrder {
    PendingOrder {
        id: OrderId::new(),
        date: Some(d(1)),
        symbol: "ROP".to_string(),
        limit: Micros::new(limit_micros),
        shares,
        track: Track::Three,
        signal: String::new(),
        thesis: String::new(),
        notes: String::new(),
        status: OrderStatus::Pending,
    }
}

fn apply_all(orders: &[PendingOrder]) -> Position {
    let mut ledger = Ledger::with_symbols(["ROP"], Micros::from_dollars(1_000_000));
    for (i, o) in orders.iter().enumerate() {
        ledger.record_fill(o, d(2 + i as u32)).unwrap();
    }
    ledger.position("ROP").unwrap().clone()
}

// ---------------------------------------------------------------------------
// 1 + 2: Permutation invariance
// ---------------------------------------------------------------------------

#[test]
fn all_permutations_agree() {
    let a = buy(7, 401_330_000);
    let b = buy(3, 389_990_000);
    let c = buy(11, 412_050_000);

    let perms = [
        vec![a.clone(), b.clone(), c.clone()],
        vec![a.clone(), c.clone(), b.clone()],
        vec![b.clone(), a.clone(), c.clone()],
        vec![b.clone(), c.clone(), a.clone()],
        vec![c.clone(), a.clone(), b.clone()],
        vec![c.clone(), b.clone(), a.clone()],
    ];

    let first = apply_all(&perms[0]);
    for p in &perms[1..] {
        let pos = apply_all(p);
        assert_eq!(pos.shares, first.shares);
        assert_eq!(pos.invested, first.invested);
        assert_eq!(pos.avg_cost(), first.avg_cost());
    }

    let invested = 7 * 401_330_000 + 3 * 389_990_000 + 11 * 412_050_000;
    assert_eq!(first.shares, 21);
    assert_eq!(first.invested, Micros::new(invested));
    assert_eq!(first.avg_cost(), Micros::new(invested / 21));
}

#[test]
fn equal_price_buys_keep_price_as_average() {
    let pos = apply_all(&[buy(5, 100 * M), buy(5, 100 * M)]);
    assert_eq!(pos.avg_cost(), Micros::new(100 * M));
}

// ---------------------------------------------------------------------------
// 3: First-acquisition date
// ---------------------------------------------------------------------------

#[test]
fn first_acquired_is_sticky() {
    let pos = apply_all(&[buy(1, 10 * M), buy(1, 20 * M), buy(1, 30 * M)]);
    assert_eq!(pos.first_acquired, Some(d(2)));
}
