//! Index-vs-portfolio benchmark series.
//!
//! returns = (x - base) / base, base = first row of the series (or today's
//! own values when the series is empty, giving 0% on day one).
//! alpha = portfolio return - index return.

use chrono::NaiveDate;

use crate::types::BenchmarkRow;
use crate::{Ledger, Micros};

fn pct_change(value: Micros, base: Micros) -> f64 {
    if base.raw() == 0 {
        return 0.0;
    }
    (value.to_f64() - base.to_f64()) / base.to_f64()
}

/// Compute today's benchmark row from the ledger's marked positions.
///
/// Does not append; the caller decides via [`Ledger::append_benchmark`].
pub fn compute_benchmark_row(ledger: &Ledger, date: NaiveDate, index_price: Micros) -> BenchmarkRow {
    let portfolio_value = ledger.portfolio_value();
    let (base_index, base_portfolio) = match ledger.benchmark().first() {
        Some(base) => (base.index_price, base.portfolio_value),
        None => (index_price, portfolio_value),
    };

    let index_return = pct_change(index_price, base_index);
    let portfolio_return = pct_change(portfolio_value, base_portfolio);

    BenchmarkRow {
        date,
        index_price,
        portfolio_value,
        index_return,
        portfolio_return,
        alpha: portfolio_return - index_return,
    }
}
