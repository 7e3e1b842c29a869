//! On-disk row shapes. Every cell is a string; typing happens in
//! [`crate::csv_store`] so malformed rows can be preserved verbatim.

use serde::{Deserialize, Serialize};

pub const POSITIONS_FILE: &str = "positions.csv";
pub const PENDING_FILE: &str = "pending_orders.csv";
pub const ACTION_LOG_FILE: &str = "action_log.csv";
pub const BENCHMARK_FILE: &str = "benchmark.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionRecord {
    pub symbol: String,
    pub shares: String,
    pub avg_cost: String,
    pub current_price: String,
    pub cash: String,
    pub first_buy_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingRecord {
    pub date: String,
    pub symbol: String,
    pub limit: String,
    pub shares: String,
    pub track: String,
    pub signal: String,
    pub thesis: String,
    pub notes: String,
    pub status: String,
}

impl PendingRecord {
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.date,
            self.symbol,
            self.limit,
            self.shares,
            self.track,
            self.signal,
            self.thesis,
            self.notes,
            self.status,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLogRecord {
    pub date: String,
    pub symbol: String,
    pub track: String,
    pub action: String,
    pub shares: String,
    pub price: String,
    pub signal: String,
    pub thesis: String,
    pub notes: String,
}

impl ActionLogRecord {
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.date,
            self.symbol,
            self.track,
            self.action,
            self.shares,
            self.price,
            self.signal,
            self.thesis,
            self.notes,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkRecord {
    pub date: String,
    pub index_price: String,
    pub portfolio_value: String,
    pub index_return: String,
    pub portfolio_return: String,
    pub alpha: String,
}
