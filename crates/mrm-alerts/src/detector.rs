//! Alert detector.
//!
//! Rules per watchlist symbol (thresholds from [`AlertThresholds`]):
//!
//! | Rule          | Class | Fires when                                          |
//! |---------------|-------|-----------------------------------------------------|
//! | sharp drop    | A     | change % <= -single_day_drop_pct                    |
//! | near target   | B     | target > 0 and (close - target)/target % <= near_target_pct |
//! | near 52w low  | info  | low252 > 0 and (close - low252)/low252 % <= near_low_pct |
//! | below 50d MA  | info  | close < MA and (MA - close)/MA % >= below_ma_pct    |
//!
//! A symbol with at least one fired rule becomes an [`Alert`]. Ordering:
//! class-A first, then class-B, then ascending target distance (no target
//! sorts as [`NO_TARGET_DISTANCE`]), then symbol.

use std::cmp::Ordering;

use mrm_config::{AlertThresholds, Strategy, TrackerConfig, WatchlistEntry};
use mrm_md::{InstrumentSnapshot, MarketSnapshot};
use serde::Serialize;

/// Sort key stand-in for symbols without a target.
pub const NO_TARGET_DISTANCE: f64 = 999.0;

/// Outcome of every rule, fired or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RuleOutcomes {
    pub sharp_drop: bool,
    pub near_target: bool,
    pub near_low: bool,
    pub below_ma: bool,
}

impl RuleOutcomes {
    pub fn any(&self) -> bool {
        self.sharp_drop || self.near_target || self.near_low || self.below_ma
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub symbol: String,
    pub name: String,
    pub strategy: Strategy,
    pub tier: String,
    pub snapshot: InstrumentSnapshot,
    pub target: f64,
    pub add_target: f64,
    /// Percent distance of close from target; `None` without a target.
    pub target_distance_pct: Option<f64>,
    pub exit_criteria: String,
    /// Rendered descriptions of the fired rules, in rule order. Never empty.
    pub signals: Vec<String>,
    pub rules: RuleOutcomes,
    pub class_a: bool,
    pub class_b: bool,
}

impl Alert {
    fn sort_distance(&self) -> f64 {
        self.target_distance_pct.unwrap_or(NO_TARGET_DISTANCE)
    }
}

/// Result of one detector pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AlertScan {
    pub alerts: Vec<Alert>,
    /// Number of class-A triggers; one trigger-history entry each.
    pub class_a_count: usize,
}

fn pct_from(value: f64, base: f64) -> f64 {
    (value - base) / base * 100.0
}

fn evaluate(
    entry: &WatchlistEntry,
    snap: &InstrumentSnapshot,
    t: &AlertThresholds,
) -> Option<Alert> {
    let close = snap.close.to_f64();
    let mut rules = RuleOutcomes::default();
    let mut signals = Vec::new();

    if snap.change_pct <= -t.single_day_drop_pct {
        rules.sharp_drop = true;
        signals.push(format!("SINGLE-DAY DROP: {:.1}%", snap.change_pct));
    }

    let target_distance_pct = (entry.target > 0.0).then(|| pct_from(close, entry.target));
    if let Some(distance) = target_distance_pct {
        if distance <= t.near_target_pct {
            rules.near_target = true;
            signals.push(format!("NEAR TARGET: {distance:+.1}% from ${}", entry.target));
        }
    }

    if snap.low_252.is_positive() {
        let above_low = pct_from(close, snap.low_252.to_f64());
        if above_low <= t.near_low_pct {
            rules.near_low = true;
            signals.push(format!(
                "NEAR 52-WEEK LOW: {above_low:.1}% above ${}",
                snap.low_252.fmt_cents()
            ));
        }
    }

    if snap.ma_50.is_positive() && snap.close < snap.ma_50 {
        let ma = snap.ma_50.to_f64();
        let below = (ma - close) / ma * 100.0;
        if below >= t.below_ma_pct {
            rules.below_ma = true;
            signals.push(format!(
                "BELOW 50-DAY MA: {below:.1}% below ${}",
                snap.ma_50.fmt_cents()
            ));
        }
    }

    if !rules.any() {
        return None;
    }
    Some(Alert {
        symbol: entry.symbol.clone(),
        name: entry.name.clone(),
        strategy: entry.strategy,
        tier: entry.tier.clone(),
        snapshot: snap.clone(),
        target: entry.target,
        add_target: entry.add_target,
        target_distance_pct,
        exit_criteria: entry.exit_criteria.clone(),
        signals,
        rules,
        class_a: rules.sharp_drop,
        class_b: rules.near_target,
    })
}

fn priority(a: &Alert, b: &Alert) -> Ordering {
    b.class_a
        .cmp(&a.class_a)
        .then(b.class_b.cmp(&a.class_b))
        .then(a.sort_distance().total_cmp(&b.sort_distance()))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Run every rule for each watchlist symbol that has a snapshot this batch.
///
/// Symbols in the snapshot but not on the watchlist carry no metadata and
/// are ignored; watchlist symbols missing from the snapshot are skipped.
pub fn detect_alerts(cfg: &TrackerConfig, market: &MarketSnapshot) -> AlertScan {
    let mut alerts: Vec<Alert> = cfg
        .watchlist
        .iter()
        .filter_map(|entry| {
            let snap = market.get(&entry.symbol)?;
            evaluate(entry, snap, &cfg.thresholds)
        })
        .collect();
    alerts.sort_by(priority);

    let class_a_count = alerts.iter().filter(|a| a.class_a).count();
    for alert in &alerts {
        tracing::info!(
            symbol = %alert.symbol,
            class_a = alert.class_a,
            class_b = alert.class_b,
            signals = %alert.signals.join(" | "),
            "ALERT"
        );
    }
    AlertScan {
        alerts,
        class_a_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrm_ledger::Micros;

    fn entry(symbol: &str, target: f64) -> WatchlistEntry {
        WatchlistEntry {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc"),
            strategy: Strategy::Hunt,
            tier: "1".to_string(),
            target,
            add_target: 0.0,
            exit_criteria: String::new(),
        }
    }

    /// close 100, MA 100, low252 50: no rule fires unless overridden.
    fn quiet() -> InstrumentSnapshot {
        InstrumentSnapshot {
            close: Micros::from_dollars(100),
            low: Micros::from_dollars(99),
            prev_close: Micros::from_dollars(100),
            change_pct: 0.0,
            ma_50: Micros::from_dollars(100),
            low_252: Micros::from_dollars(50),
            high_252: Micros::from_dollars(150),
            trailing_pe: None,
            forward_pe: None,
        }
    }

    #[test]
    fn quiet_symbol_produces_no_alert() {
        assert!(evaluate(&entry("X", 0.0), &quiet(), &AlertThresholds::default()).is_none());
    }

    #[test]
    fn drop_boundary_is_inclusive() {
        let mut s = quiet();
        s.change_pct = -5.0;
        let a = evaluate(&entry("X", 0.0), &s, &AlertThresholds::default()).unwrap();
        assert!(a.class_a);
        assert_eq!(a.signals, vec!["SINGLE-DAY DROP: -5.0%".to_string()]);

        s.change_pct = -4.99;
        assert!(evaluate(&entry("X", 0.0), &s, &AlertThresholds::default()).is_none());
    }

    #[test]
    fn near_target_renders_signed_distance() {
        let a = evaluate(&entry("X", 96.0), &quiet(), &AlertThresholds::default()).unwrap();
        assert!(a.class_b);
        assert!(!a.class_a);
        assert_eq!(a.signals, vec!["NEAR TARGET: +4.2% from $96".to_string()]);
    }

    #[test]
    fn price_below_target_is_near() {
        let a = evaluate(&entry("X", 120.0), &quiet(), &AlertThresholds::default()).unwrap();
        assert!(a.rules.near_target);
        assert!(a.target_distance_pct.unwrap() < 0.0);
    }

    #[test]
    fn near_low_and_below_ma_are_informational() {
        let mut s = quiet();
        s.low_252 = Micros::from_dollars(94);
        s.ma_50 = Micros::from_dollars(104);
        let a = evaluate(&entry("X", 0.0), &s, &AlertThresholds::default()).unwrap();
        assert!(!a.class_a && !a.class_b);
        assert_eq!(
            a.signals,
            vec![
                "NEAR 52-WEEK LOW: 6.4% above $94.00".to_string(),
                "BELOW 50-DAY MA: 3.8% below $104.00".to_string(),
            ]
        );
    }

    #[test]
    fn zero_low_and_zero_ma_do_not_fire() {
        let mut s = quiet();
        s.low_252 = Micros::ZERO;
        s.ma_50 = Micros::ZERO;
        assert!(evaluate(&entry("X", 0.0), &s, &AlertThresholds::default()).is_none());
    }
}
