use std::collections::BTreeSet;

use chrono::NaiveDate;
use mrm_ledger::{Ledger, LedgerError, OrderId, PendingOrder, Table};
use mrm_md::MarketSnapshot;

use crate::{
    ExpiredOrder, FilledOrder, KeepReason, KeptOrder, ReconcileReport, SkipReason, SkippedOrder,
};

enum Disposition {
    Fill(FilledOrder),
    Expire(ExpiredOrder),
    Keep(KeepReason),
    Skip(SkipReason),
}

fn is_stale(order: &PendingOrder, trade_date: NaiveDate) -> bool {
    order.track.is_day_order() && order.date.is_some_and(|d| d < trade_date)
}

/// Evaluate one order. Fills are applied to the ledger here so that later
/// orders see the reduced cash.
fn evaluate(ledger: &mut Ledger, order: &PendingOrder, market: &MarketSnapshot) -> Disposition {
    let trade_date = market.trade_date;

    if !order.status.is_pending() {
        return Disposition::Skip(SkipReason::Terminal {
            status: order.status.as_str().to_string(),
        });
    }
    if let Some(order_date) = order.date {
        if order_date > trade_date {
            return Disposition::Skip(SkipReason::FutureDated { order_date });
        }
    }
    let Some(inst) = market.get(&order.symbol) else {
        return Disposition::Skip(SkipReason::NoMarketData);
    };

    if inst.low <= order.limit {
        return match ledger.record_fill(order, trade_date) {
            Ok(entry) => Disposition::Fill(FilledOrder {
                order_id: order.id,
                symbol: order.symbol.clone(),
                track: order.track,
                shares: entry.shares,
                price: entry.price,
                cost: order.cost().unwrap_or_default(),
                stale_day_order: is_stale(order, trade_date),
            }),
            Err(LedgerError::InsufficientCash {
                required,
                available,
            }) => Disposition::Keep(KeepReason::Blocked {
                required,
                available,
            }),
            Err(other) => Disposition::Skip(SkipReason::Invalid {
                reason: other.to_string(),
            }),
        };
    }

    if !order.track.is_day_order() {
        return Disposition::Keep(KeepReason::GoodTillCanceled);
    }
    match order.date {
        // Future dates were skipped above, so trade_date >= order_date here.
        Some(order_date) => Disposition::Expire(ExpiredOrder {
            order_id: order.id,
            symbol: order.symbol.clone(),
            track: order.track,
            order_date,
            stale_day_order: is_stale(order, trade_date),
        }),
        None => Disposition::Keep(KeepReason::DayOrderUndated),
    }
}

/// Reconcile every pending order in ledger order against `market`.
///
/// Fills debit ledger cash and append action-log entries as they happen;
/// filled and expired orders are removed from the ledger at the end.
/// Survivors and skipped rows stay.
pub fn reconcile_orders(ledger: &mut Ledger, market: &MarketSnapshot) -> ReconcileReport {
    let trade_date = market.trade_date;
    let mut report = ReconcileReport::empty(trade_date, ledger.cash());
    let mut remove: BTreeSet<OrderId> = BTreeSet::new();

    for raw in ledger
        .raw_rows()
        .iter()
        .filter(|r| r.table == Table::PendingOrders)
    {
        report.skipped.push(SkippedOrder {
            order_id: None,
            symbol: raw.cells.get(1).cloned().unwrap_or_default(),
            reason: SkipReason::Unreadable {
                reason: raw.reason.clone(),
            },
        });
    }

    let orders: Vec<PendingOrder> = ledger.pending().to_vec();
    for order in &orders {
        match evaluate(ledger, order, market) {
            Disposition::Fill(fill) => {
                tracing::info!(
                    symbol = %fill.symbol,
                    shares = fill.shares,
                    price = %fill.price,
                    cost = %fill.cost,
                    cash = %ledger.cash(),
                    "FILLED"
                );
                if fill.stale_day_order {
                    tracing::warn!(
                        symbol = %fill.symbol,
                        order_date = ?order.date,
                        %trade_date,
                        "day order filled after its placement session"
                    );
                }
                remove.insert(order.id);
                report.fills.push(fill);
            }
            Disposition::Expire(exp) => {
                tracing::info!(symbol = %exp.symbol, track = %exp.track, "EXPIRED");
                if exp.stale_day_order {
                    tracing::warn!(
                        symbol = %exp.symbol,
                        order_date = %exp.order_date,
                        %trade_date,
                        "day order expired after its placement session"
                    );
                }
                remove.insert(order.id);
                report.expirations.push(exp);
            }
            Disposition::Keep(reason) => {
                match &reason {
                    KeepReason::Blocked {
                        required,
                        available,
                    } => tracing::warn!(
                        symbol = %order.symbol,
                        required = %required,
                        available = %available,
                        "BLOCKED: insufficient cash"
                    ),
                    other => tracing::debug!(symbol = %order.symbol, reason = ?other, "KEPT"),
                }
                report.kept.push(KeptOrder {
                    order_id: order.id,
                    symbol: order.symbol.clone(),
                    reason,
                });
            }
            Disposition::Skip(reason) => {
                tracing::debug!(symbol = %order.symbol, reason = ?reason, "SKIP");
                report.skipped.push(SkippedOrder {
                    order_id: Some(order.id),
                    symbol: order.symbol.clone(),
                    reason,
                });
            }
        }
    }

    ledger.remove_pending(&remove);
    report.cash_after = ledger.cash();

    tracing::info!(
        %trade_date,
        fills = report.fills.len(),
        expired = report.expirations.len(),
        kept = report.kept.len(),
        skipped = report.skipped.len(),
        cash_before = %report.cash_before,
        cash_after = %report.cash_after,
        "reconcile complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrm_ledger::{Micros, OrderStatus, Track};
    use mrm_md::InstrumentSnapshot;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn inst(low: i64) -> InstrumentSnapshot {
        InstrumentSnapshot {
            close: Micros::from_dollars(low + 2),
            low: Micros::from_dollars(low),
            prev_close: Micros::from_dollars(low + 5),
            change_pct: -3.0,
            ma_50: Micros::from_dollars(low + 10),
            low_252: Micros::from_dollars(low - 10),
            high_252: Micros::from_dollars(low + 50),
            trailing_pe: None,
            forward_pe: None,
        }
    }

    fn order(symbol: &str, limit: i64, track: Track, date: Option<NaiveDate>) -> PendingOrder {
        PendingOrder {
            id: OrderId::new(),
            date,
            symbol: symbol.to_string(),
            limit: Micros::from_dollars(limit),
            shares: 1,
            track,
            signal: String::new(),
            thesis: String::new(),
            notes: String::new(),
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn gtc_not_touched_is_kept() {
        let mut ledger = Ledger::new(Micros::from_dollars(1_000));
        ledger.push_pending(order("X", 90, Track::Three, Some(d(20))));
        let market = MarketSnapshot::new(d(26)).with_instrument("X", inst(94));

        let report = reconcile_orders(&mut ledger, &market);
        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].reason, KeepReason::GoodTillCanceled);
        assert_eq!(ledger.pending().len(), 1);
    }

    #[test]
    fn day_order_expires_and_is_flagged_stale() {
        let mut ledger = Ledger::new(Micros::from_dollars(1_000));
        ledger.push_pending(order("X", 90, Track::Two, Some(d(22))));
        ledger.push_pending(order("X", 90, Track::One, Some(d(26))));
        let market = MarketSnapshot::new(d(26)).with_instrument("X", inst(94));

        let report = reconcile_orders(&mut ledger, &market);
        assert_eq!(report.expirations.len(), 2);
        assert!(report.expirations[0].stale_day_order);
        assert!(!report.expirations[1].stale_day_order);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn undated_day_order_is_kept() {
        let mut ledger = Ledger::new(Micros::from_dollars(1_000));
        ledger.push_pending(order("X", 90, Track::One, None));
        let market = MarketSnapshot::new(d(26)).with_instrument("X", inst(94));

        let report = reconcile_orders(&mut ledger, &market);
        assert_eq!(report.kept[0].reason, KeepReason::DayOrderUndated);
    }

    #[test]
    fn skips_terminal_future_and_unpriced() {
        let mut ledger = Ledger::new(Micros::from_dollars(1_000));
        let mut done = order("X", 99, Track::One, Some(d(20)));
        done.status = OrderStatus::Terminal("FILLED".to_string());
        ledger.push_pending(done);
        ledger.push_pending(order("X", 99, Track::One, Some(d(27))));
        ledger.push_pending(order("Z", 99, Track::One, Some(d(26))));
        let market = MarketSnapshot::new(d(26)).with_instrument("X", inst(94));

        let report = reconcile_orders(&mut ledger, &market);
        assert_eq!(report.evaluated(), 0);
        let reasons: Vec<&SkipReason> = report.skipped.iter().map(|s| &s.reason).collect();
        assert!(matches!(reasons[0], SkipReason::Terminal { .. }));
        assert!(matches!(reasons[1], SkipReason::FutureDated { .. }));
        assert_eq!(reasons[2], &SkipReason::NoMarketData);
        assert_eq!(ledger.pending().len(), 3);
    }

    #[test]
    fn earlier_fill_can_block_later_order() {
        let mut ledger = Ledger::new(Micros::from_dollars(150));
        ledger.push_pending(order("X", 100, Track::Three, None));
        ledger.push_pending(order("Y", 100, Track::Three, None));
        let market = MarketSnapshot::new(d(26))
            .with_instrument("X", inst(94))
            .with_instrument("Y", inst(94));

        let report = reconcile_orders(&mut ledger, &market);
        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.fills[0].symbol, "X");
        assert_eq!(report.blocked().count(), 1);
        assert_eq!(report.cash_after, Micros::from_dollars(50));
        assert_eq!(report.spent(), Micros::from_dollars(100));
        assert_eq!(ledger.pending().len(), 1);
        assert_eq!(ledger.pending()[0].symbol, "Y");
    }
}
