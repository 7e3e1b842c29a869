use chrono::NaiveDate;
use mrm_ledger::{Micros, OrderId, Track};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilledOrder {
    pub order_id: OrderId,
    pub symbol: String,
    pub track: Track,
    pub shares: i64,
    pub price: Micros,
    pub cost: Micros,
    /// Day order filled on a trade date after its placement date.
    pub stale_day_order: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpiredOrder {
    pub order_id: OrderId,
    pub symbol: String,
    pub track: Track,
    pub order_date: NaiveDate,
    /// Day order expired on a trade date after its placement date.
    pub stale_day_order: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum KeepReason {
    /// Fillable, but the cost exceeds the running cash balance.
    Blocked { required: Micros, available: Micros },
    GoodTillCanceled,
    /// Day order without a usable placement date.
    DayOrderUndated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeptOrder {
    pub order_id: OrderId,
    pub symbol: String,
    pub reason: KeepReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Terminal { status: String },
    FutureDated { order_date: NaiveDate },
    NoMarketData,
    /// Stored row could not be typed (missing limit, shares, ...).
    Unreadable { reason: String },
    /// Fill arithmetic failed (cost overflow).
    Invalid { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedOrder {
    /// `None` for unreadable rows, which never get an id.
    pub order_id: Option<OrderId>,
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub trade_date: NaiveDate,
    pub fills: Vec<FilledOrder>,
    pub expirations: Vec<ExpiredOrder>,
    pub kept: Vec<KeptOrder>,
    pub skipped: Vec<SkippedOrder>,
    pub cash_before: Micros,
    pub cash_after: Micros,
}

impl ReconcileReport {
    pub fn empty(trade_date: NaiveDate, cash: Micros) -> Self {
        Self {
            trade_date,
            fills: Vec::new(),
            expirations: Vec::new(),
            kept: Vec::new(),
            skipped: Vec::new(),
            cash_before: cash,
            cash_after: cash,
        }
    }

    /// Orders that landed in fill, expire or keep.
    pub fn evaluated(&self) -> usize {
        self.fills.len() + self.expirations.len() + self.kept.len()
    }

    pub fn blocked(&self) -> impl Iterator<Item = &KeptOrder> {
        self.kept
            .iter()
            .filter(|k| matches!(k.reason, KeepReason::Blocked { .. }))
    }

    /// Total cash spent on fills this batch.
    pub fn spent(&self) -> Micros {
        self.fills.iter().map(|f| f.cost).sum()
    }
}
