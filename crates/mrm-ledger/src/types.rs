use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::Micros;

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Order class. Tracks 1 and 2 are day orders; track 3 is good-till-canceled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Track {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Track {
    /// Parse the stored/typed form (`"1"`, `"2"`, `"3"`).
    pub fn parse(raw: &str) -> Option<Track> {
        match raw.trim() {
            "1" => Some(Track::One),
            "2" => Some(Track::Two),
            "3" => Some(Track::Three),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Track::One => "1",
            Track::Two => "2",
            Track::Three => "3",
        }
    }

    /// Day orders expire unfilled at their first evaluation on or after the
    /// placement date.
    pub fn is_day_order(self) -> bool {
        matches!(self, Track::One | Track::Two)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Order status / id
// ---------------------------------------------------------------------------

/// `PENDING` (or an empty status cell) is the only evaluable state; any other
/// stored status is terminal and the row is carried through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    Pending,
    Terminal(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> OrderStatus {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("PENDING") {
            OrderStatus::Pending
        } else {
            OrderStatus::Terminal(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Terminal(s) => s,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

/// Synthetic in-memory identity of a pending order. Never persisted; the
/// store assigns fresh ids on every load.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        OrderId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Pending order
// ---------------------------------------------------------------------------

/// A stored limit order awaiting reconciliation.
///
/// Construction through the store guarantees `limit > 0` and `shares >= 1`;
/// rows that fail those checks become [`RawRow`]s instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingOrder {
    pub id: OrderId,
    /// Placement date. `None` when the stored cell is empty.
    pub date: Option<NaiveDate>,
    pub symbol: String,
    pub limit: Micros,
    pub shares: i64,
    pub track: Track,
    pub signal: String,
    pub thesis: String,
    pub notes: String,
    pub status: OrderStatus,
}

impl PendingOrder {
    /// Total cash required to fill at the limit. `None` on overflow.
    pub fn cost(&self) -> Option<Micros> {
        self.limit.checked_mul_qty(self.shares)
    }
}

// ---------------------------------------------------------------------------
// Action log
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    #[serde(rename = "BUY")]
    Buy,
}

impl ActionKind {
    pub fn parse(raw: &str) -> Option<ActionKind> {
        if raw.trim().eq_ignore_ascii_case("BUY") {
            Some(ActionKind::Buy)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Buy => "BUY",
        }
    }
}

/// Append-only record of an executed fill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionLogEntry {
    pub date: NaiveDate,
    pub symbol: String,
    pub track: Track,
    pub action: ActionKind,
    pub shares: i64,
    pub price: Micros,
    pub signal: String,
    pub thesis: String,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Holding in one watchlist symbol.
///
/// The source of truth is `invested` (cumulative cost of all buys); average
/// cost is derived so that the weighted average never drifts with the order
/// in which fills arrive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Position {
    pub symbol: String,
    pub shares: i64,
    pub invested: Micros,
    pub first_acquired: Option<NaiveDate>,
    /// Last marked close.
    pub last_price: Option<Micros>,
}

impl Position {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            shares: 0,
            invested: Micros::ZERO,
            first_acquired: None,
            last_price: None,
        }
    }

    /// Average cost per share; zero for a flat position.
    pub fn avg_cost(&self) -> Micros {
        if self.shares <= 0 {
            return Micros::ZERO;
        }
        self.invested
            .checked_div_qty(self.shares)
            .unwrap_or(Micros::ZERO)
    }

    /// shares × last price (zero when unmarked). Saturates on overflow.
    pub fn market_value(&self) -> Micros {
        match self.last_price {
            Some(px) => px.checked_mul_qty(self.shares).unwrap_or(Micros::MAX),
            None => Micros::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Benchmark series
// ---------------------------------------------------------------------------

/// One point of the index-vs-portfolio return series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub date: NaiveDate,
    pub index_price: Micros,
    pub portfolio_value: Micros,
    pub index_return: f64,
    pub portfolio_return: f64,
    pub alpha: f64,
}

// ---------------------------------------------------------------------------
// Unreadable rows
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Table {
    PendingOrders,
    ActionLog,
    Benchmark,
}

/// A stored row that could not be typed. Preserved verbatim (cells in column
/// order) and written back on flush at its original position; never
/// evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RawRow {
    pub table: Table,
    /// Number of typed rows of `table` that precede this row.
    pub after: usize,
    pub cells: Vec<String>,
    pub reason: String,
}
