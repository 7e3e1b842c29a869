//! mrm-runtime
//!
//! One batch = one trading day. [`BatchRunner::run_batch`] drives:
//!
//! 1. load the ledger
//! 2. mark positions to the snapshot closes
//! 3. reconcile pending orders
//! 4. append the benchmark row
//! 5. detect alerts; record class-A triggers and save the history file
//! 6. ingest decision text (optional)
//! 7. flush the ledger
//! 8. report regime status
//!
//! Missing ledger or missing market data fail the batch before anything is
//! written. Everything after that is per-row and never fatal.

mod batch;
mod error;

pub use batch::{BatchReport, BatchRunner, IngestOnlyReport};
pub use error::BatchError;
