//! mrm-reconcile
//!
//! Pending-order reconciliation against one day's market snapshot.
//!
//! Per evaluable order, exactly one outcome:
//! - FILL: day low <= limit and cash covers shares x limit
//! - EXPIRE: day order (track 1/2), not filled, trade date >= order date
//! - KEEP: blocked by cash, good-till-canceled, or undated day order
//!
//! Terminal, future-dated, unreadable and unpriced orders are skipped and
//! stay in the ledger untouched. No per-order error is fatal.
//!
//! Deterministic, pure logic over the in-memory ledger. No IO.

mod engine;
mod types;

pub use engine::reconcile_orders;
pub use types::*;
