use std::collections::BTreeSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    /// Long-term compounder held through cycles.
    Core,
    /// Waits for a specific entry price.
    Hunt,
    /// Accumulated on a schedule.
    Dca,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Core => "CORE",
            Strategy::Hunt => "HUNT",
            Strategy::Dca => "DCA",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String,
    pub strategy: Strategy,
    pub tier: String,
    /// Full-position target price in dollars; 0 means "no target".
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub add_target: f64,
    #[serde(default)]
    pub exit_criteria: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertThresholds {
    pub single_day_drop_pct: f64,
    pub near_target_pct: f64,
    pub near_low_pct: f64,
    pub below_ma_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            single_day_drop_pct: 5.0,
            near_target_pct: 10.0,
            near_low_pct: 15.0,
            below_ma_pct: 3.0,
        }
    }
}

/// Longest accepted regime window (ten years).
pub const MAX_WINDOW_DAYS: i64 = 3_650;

/// Class-A trigger density that suspends the regime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegimePolicy {
    pub trigger_threshold: usize,
    pub window_days: i64,
}

impl Default for RegimePolicy {
    fn default() -> Self {
        Self {
            trigger_threshold: 5,
            window_days: 10,
        }
    }
}

/// Immutable tracker configuration injected into every component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    pub watchlist: Vec<WatchlistEntry>,
    #[serde(default)]
    pub thresholds: AlertThresholds,
    #[serde(default)]
    pub regime: RegimePolicy,
    pub benchmark_symbol: String,
}

impl TrackerConfig {
    pub fn entry(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.watchlist.iter().find(|e| e.symbol == symbol)
    }

    pub fn is_watched(&self, symbol: &str) -> bool {
        self.entry(symbol).is_some()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.watchlist.iter().map(|e| e.symbol.as_str())
    }

    pub fn validate(&self) -> Result<()> {
        if self.watchlist.is_empty() {
            bail!("CONFIG_INVALID: watchlist is empty");
        }

        let mut seen = BTreeSet::new();
        for e in &self.watchlist {
            let sym = e.symbol.trim();
            if sym.is_empty() {
                bail!("CONFIG_INVALID: watchlist entry with empty symbol");
            }
            if sym != e.symbol || sym.to_ascii_uppercase() != sym {
                bail!(
                    "CONFIG_INVALID: symbol '{}' must be trimmed upper-case",
                    e.symbol
                );
            }
            if !seen.insert(sym) {
                bail!("CONFIG_INVALID: duplicate watchlist symbol {sym}");
            }
            for (field, v) in [("target", e.target), ("add_target", e.add_target)] {
                if !v.is_finite() || v < 0.0 {
                    bail!("CONFIG_INVALID: {sym}.{field} must be >= 0, got {v}");
                }
            }
        }

        let t = &self.thresholds;
        for (field, v) in [
            ("single_day_drop_pct", t.single_day_drop_pct),
            ("near_target_pct", t.near_target_pct),
            ("near_low_pct", t.near_low_pct),
            ("below_ma_pct", t.below_ma_pct),
        ] {
            if !v.is_finite() || v < 0.0 {
                bail!("CONFIG_INVALID: thresholds.{field} must be >= 0, got {v}");
            }
        }

        if self.regime.trigger_threshold == 0 {
            bail!("CONFIG_INVALID: regime.trigger_threshold must be > 0");
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.regime.window_days) {
            bail!(
                "CONFIG_INVALID: regime.window_days must be in 1..={MAX_WINDOW_DAYS}, got {}",
                self.regime.window_days
            );
        }
        if self.benchmark_symbol.trim().is_empty() {
            bail!("CONFIG_INVALID: benchmark_symbol is empty");
        }
        Ok(())
    }
}
