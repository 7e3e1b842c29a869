use chrono::NaiveDate;
use mrm_config::TrackerConfig;
use mrm_ledger::{Ledger, OrderId, OrderKey, OrderStatus, PendingOrder, Track};

use crate::{
    parse_decisions, CashReservation, Decision, DecisionOutcome, IngestReport, Verdict,
};

struct Rejection {
    verdict: Verdict,
    reason: String,
    key: Option<OrderKey>,
}

fn skip(reason: impl Into<String>) -> Rejection {
    Rejection {
        verdict: Verdict::Skipped,
        reason: reason.into(),
        key: None,
    }
}

fn reject(reason: impl Into<String>) -> Rejection {
    Rejection {
        verdict: Verdict::Rejected,
        reason: reason.into(),
        key: None,
    }
}

/// Run the validation chain for one decision. On success the order is
/// returned and its cost is already reserved.
fn validate(
    ledger: &Ledger,
    cfg: &TrackerConfig,
    d: &Decision,
    as_of: NaiveDate,
    cash: &mut CashReservation,
) -> Result<PendingOrder, Rejection> {
    if d.action.is_passive() {
        return Err(skip(format!("action is {} (no order)", d.action)));
    }
    if !d.action.is_order_producing() {
        return Err(reject(format!("action must be BUY or ADD (got: {})", d.action)));
    }
    if !cfg.is_watched(&d.ticker) {
        return Err(reject("not in watchlist"));
    }
    if d.shares < 1 {
        return Err(reject(format!("shares must be >= 1 (got: {})", d.shares)));
    }
    if !d.limit.is_positive() {
        return Err(reject(format!("limit must be > 0 (got: {})", d.limit)));
    }
    let Some(track) = Track::parse(&d.track) else {
        return Err(reject(format!("track must be 1, 2, or 3 (got: {})", d.track)));
    };

    let date = d.date.unwrap_or(as_of);
    let key = OrderKey::new(Some(date), &d.ticker, track, d.limit, d.shares);
    if ledger.contains_key(&key) {
        return Err(Rejection {
            key: Some(key),
            ..skip("order already exists")
        });
    }

    let Some(cost) = d.limit.checked_mul_qty(d.shares) else {
        return Err(Rejection {
            key: Some(key),
            ..reject("order cost overflows")
        });
    };
    if let Err(e) = cash.reserve(cost) {
        return Err(Rejection {
            key: Some(key),
            ..reject(e.to_string())
        });
    }

    Ok(PendingOrder {
        id: OrderId::new(),
        date: Some(date),
        symbol: d.ticker.clone(),
        limit: d.limit,
        shares: d.shares,
        track,
        signal: d.signal.clone(),
        thesis: d.thesis.clone(),
        notes: d.notes.clone(),
        status: OrderStatus::Pending,
    })
}

/// Validate already-parsed decisions in order and append the accepted ones
/// to `ledger` as PENDING orders.
///
/// Orders accepted earlier in the same call take part in the idempotency
/// check of later ones. Ledger cash is not touched.
pub fn ingest_parsed(
    ledger: &mut Ledger,
    cfg: &TrackerConfig,
    decisions: &[Decision],
    as_of: NaiveDate,
) -> IngestReport {
    let mut cash = CashReservation::new(ledger.cash());
    let mut report = IngestReport {
        reservation_start: cash.available(),
        ..IngestReport::default()
    };

    for d in decisions {
        let outcome = match validate(ledger, cfg, d, as_of, &mut cash) {
            Ok(order) => {
                let key = OrderKey::of_pending(&order);
                tracing::info!(
                    ticker = %order.symbol,
                    limit = %order.limit,
                    shares = order.shares,
                    track = %order.track,
                    "ADDED"
                );
                ledger.push_pending(order);
                DecisionOutcome {
                    ticker: d.ticker.clone(),
                    action: d.action.clone(),
                    verdict: Verdict::Accepted,
                    reason: "added".to_string(),
                    key: Some(key.as_str().to_string()),
                }
            }
            Err(r) => {
                match r.verdict {
                    Verdict::Rejected => {
                        tracing::warn!(ticker = %d.ticker, reason = %r.reason, "REJECTED")
                    }
                    _ => tracing::info!(ticker = %d.ticker, reason = %r.reason, "SKIP"),
                }
                DecisionOutcome {
                    ticker: d.ticker.clone(),
                    action: d.action.clone(),
                    verdict: r.verdict,
                    reason: r.reason,
                    key: r.key.map(|k| k.as_str().to_string()),
                }
            }
        };
        report.push(outcome);
    }

    report.reservation_left = cash.available();
    tracing::info!(
        added = report.added,
        skipped = report.skipped,
        rejected = report.rejected,
        "decision ingestion complete"
    );
    report
}

/// Parse `text` and ingest every decision block found.
///
/// `as_of` stands in for missing or unreadable decision dates, both on the
/// stored order and in its idempotency key.
pub fn ingest_decisions(
    ledger: &mut Ledger,
    cfg: &TrackerConfig,
    text: &str,
    as_of: NaiveDate,
) -> IngestReport {
    let decisions = parse_decisions(text);
    tracing::info!(blocks = decisions.len(), "decision blocks found");
    ingest_parsed(ledger, cfg, &decisions, as_of)
}
