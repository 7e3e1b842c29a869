//! mrm-ingest
//!
//! Turns free-text `DECISION:` blocks into validated pending orders.
//!
//! Pipeline per ingestion call:
//! 1. [`parse_decisions`]: text → [`Decision`]s (lenient; unusable blocks are dropped)
//! 2. validation, short-circuiting, in a fixed order: passive action,
//!    action kind, watchlist, shares, limit, track, idempotency key, cash
//! 3. accepted decisions reserve their cost from a [`CashReservation`] and
//!    are appended to the ledger as PENDING orders
//!
//! Every decision gets exactly one outcome: accepted, skipped or rejected.
//! The reservation is never committed to ledger cash; cash is debited when
//! the order fills.

mod engine;
mod parser;
mod types;

pub use engine::{ingest_decisions, ingest_parsed};
pub use parser::parse_decisions;
pub use types::*;
