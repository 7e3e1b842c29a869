//! Composite idempotency key for orders and fills.
//!
//! `date|SYMBOL|track|limit(2dp)|shares`, e.g. `2026-01-26|ROP|3|400.00|10`.
//! A decision whose key matches any pending order or action-log entry has
//! already been ingested and must not create a second order.

use chrono::NaiveDate;

use crate::dates::format_date;
use crate::types::{ActionLogEntry, PendingOrder, Track};
use crate::Micros;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey(String);

impl OrderKey {
    pub fn new(
        date: Option<NaiveDate>,
        symbol: &str,
        track: Track,
        limit: Micros,
        shares: i64,
    ) -> Self {
        let date = date.map(format_date).unwrap_or_default();
        OrderKey(format!(
            "{date}|{}|{track}|{}|{shares}",
            symbol.trim().to_ascii_uppercase(),
            limit.fmt_cents()
        ))
    }

    pub fn of_pending(order: &PendingOrder) -> Self {
        Self::new(
            order.date,
            &order.symbol,
            order.track,
            order.limit,
            order.shares,
        )
    }

    /// Fills are keyed on their fill date and fill price.
    pub fn of_log_entry(entry: &ActionLogEntry) -> Self {
        Self::new(
            Some(entry.date),
            &entry.symbol,
            entry.track,
            entry.price,
            entry.shares,
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
