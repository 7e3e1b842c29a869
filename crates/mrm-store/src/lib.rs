//! mrm-store
//!
//! Durable ledger tables. The batch loads a [`Ledger`](mrm_ledger::Ledger)
//! once, mutates it in memory, and flushes it once.
//!
//! [`CsvLedgerStore`] keeps one CSV file per table in a directory:
//! `positions.csv`, `pending_orders.csv`, `action_log.csv`, `benchmark.csv`.
//! Pending, action-log and benchmark rows that cannot be typed are carried as
//! raw rows and written back unchanged.

mod csv_store;
mod error;
pub mod records;

pub use csv_store::CsvLedgerStore;
pub use error::StoreError;

use mrm_ledger::Ledger;

/// Persisted table store behind the batch.
pub trait LedgerStore {
    /// `true` if the store has been initialised.
    fn exists(&self) -> bool;

    fn load(&self) -> Result<Ledger, StoreError>;

    /// Rewrite every table from `ledger`.
    fn flush(&self, ledger: &Ledger) -> Result<(), StoreError>;
}
