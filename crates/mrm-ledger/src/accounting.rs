use chrono::NaiveDate;

use crate::ledger::LedgerError;
use crate::types::Position;
use crate::Micros;

/// A buy execution to be applied to a position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fill {
    pub symbol: String,
    pub shares: i64,
    pub price: Micros,
    pub date: NaiveDate,
}

impl Fill {
    pub fn new(symbol: impl Into<String>, shares: i64, price: Micros, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            price,
            date,
        }
    }

    /// shares × price, or the overflow error.
    pub fn cost(&self) -> Result<Micros, LedgerError> {
        self.price
            .checked_mul_qty(self.shares)
            .ok_or(LedgerError::CostOverflow {
                shares: self.shares,
                price: self.price,
            })
    }
}

/// Apply a buy to a position.
///
/// Rules:
/// - shares += fill.shares
/// - invested += fill.shares × fill.price (so avg cost is the weighted
///   average of every buy)
/// - first_acquired is set only if it was unset
///
/// The position is not mutated on error.
pub fn apply_buy(pos: &mut Position, fill: &Fill) -> Result<(), LedgerError> {
    let cost = fill.cost()?;
    let shares = pos
        .shares
        .checked_add(fill.shares)
        .ok_or(LedgerError::CostOverflow {
            shares: fill.shares,
            price: fill.price,
        })?;
    let invested = pos
        .invested
        .checked_add(cost)
        .ok_or(LedgerError::CostOverflow {
            shares: fill.shares,
            price: fill.price,
        })?;

    pos.shares = shares;
    pos.invested = invested;
    if pos.first_acquired.is_none() {
        pos.first_acquired = Some(fill.date);
    }
    Ok(())
}
