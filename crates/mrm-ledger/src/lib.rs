//! mrm-ledger
//!
//! Portfolio ledger for the daily tracker batch.
//! - Cash, positions, pending orders, action log, benchmark series
//! - Fixed-point money (`Micros`) and boundary price parsing
//! - Calendar-date normalization of stored cells
//! - Composite idempotency key shared by ingestion and the action log
//! - Pure deterministic logic (no IO, no time)
//!
//! Invariants:
//! - cash never goes negative as the result of a fill
//! - average cost is derived from cumulative invested capital
//! - the action log is append-only

mod accounting;
mod fixedpoint;
mod metrics;
mod types;

pub mod dates;
pub mod key;
pub mod ledger;
pub mod price;

pub use accounting::{apply_buy, Fill};
pub use fixedpoint::Micros;
pub use key::OrderKey;
pub use ledger::{Ledger, LedgerError, LedgerSnapshot};
pub use metrics::compute_benchmark_row;
pub use price::{micros_from_f64, parse_micros, PriceError};
pub use types::{
    ActionKind, ActionLogEntry, BenchmarkRow, OrderId, OrderStatus, PendingOrder, Position,
    RawRow, Table, Track,
};

/// Price/cash scale: micros (1e-6).
pub const MICROS_SCALE: i64 = 1_000_000;

/// Symbol of the reserved cash row in the positions table.
pub const CASH_SYMBOL: &str = "CASH";
