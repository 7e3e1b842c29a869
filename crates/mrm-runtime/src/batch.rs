use chrono::{DateTime, NaiveDate, Utc};
use mrm_alerts::{detect_alerts, is_regime_suspended, AlertScan, RegimeStatus, TriggerHistoryFile};
use mrm_config::TrackerConfig;
use mrm_ingest::{ingest_decisions, IngestReport};
use mrm_ledger::{compute_benchmark_row, BenchmarkRow, Ledger, LedgerSnapshot, Micros};
use mrm_md::MarketSnapshot;
use mrm_reconcile::{reconcile_orders, ReconcileReport};
use mrm_store::LedgerStore;
use serde::Serialize;

use crate::BatchError;

#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub trade_date: NaiveDate,
    pub reconcile: ReconcileReport,
    pub benchmark: BenchmarkRow,
    pub alerts: AlertScan,
    pub ingest: Option<IngestReport>,
    pub regime: RegimeStatus,
    /// Ledger state as flushed.
    pub ledger: LedgerSnapshot,
}

#[derive(Clone, Debug, Serialize)]
pub struct IngestOnlyReport {
    pub as_of: NaiveDate,
    pub ingest: IngestReport,
    pub ledger: LedgerSnapshot,
}

/// Runs batches against one immutable configuration.
#[derive(Clone, Debug)]
pub struct BatchRunner {
    cfg: TrackerConfig,
}

impl BatchRunner {
    pub fn new(cfg: TrackerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    fn load_ledger(store: &dyn LedgerStore) -> Result<Ledger, BatchError> {
        if !store.exists() {
            return Err(BatchError::LedgerUnavailable {
                reason: "store not initialised".to_string(),
            });
        }
        Ok(store.load()?)
    }

    /// Full daily batch. `market` is `None` when the source had nothing.
    pub fn run_batch(
        &self,
        store: &dyn LedgerStore,
        history_file: &TriggerHistoryFile,
        market: Option<&MarketSnapshot>,
        decisions: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BatchReport, BatchError> {
        // Preconditions first: nothing is written if either fails.
        let mut ledger = Self::load_ledger(store)?;
        let market = match market {
            Some(m) if !m.is_empty() => m,
            _ => {
                return Err(BatchError::NoMarketData {
                    source: "market snapshot".to_string(),
                })
            }
        };
        let trade_date = market.trade_date;
        tracing::info!(%trade_date, instruments = market.len(), "batch start");

        let symbols: Vec<String> = ledger.positions().keys().cloned().collect();
        for symbol in &symbols {
            if let Some(close) = market.close_of(symbol) {
                ledger.mark_price(symbol, close);
            }
        }

        let reconcile = reconcile_orders(&mut ledger, market);

        let index_price = market
            .close_of(&self.cfg.benchmark_symbol)
            .unwrap_or(Micros::ZERO);
        let benchmark = compute_benchmark_row(&ledger, trade_date, index_price);
        ledger.append_benchmark(benchmark.clone());

        let alerts = detect_alerts(&self.cfg, market);
        let mut history = history_file.load();
        if alerts.class_a_count > 0 {
            history.record(now, alerts.class_a_count);
            history_file.save(&history).map_err(|e| BatchError::History {
                path: history_file.path().to_path_buf(),
                message: format!("{e:#}"),
            })?;
        }

        let ingest = decisions.map(|text| ingest_decisions(&mut ledger, &self.cfg, text, trade_date));

        store.flush(&ledger)?;

        let regime = is_regime_suspended(&history, &self.cfg.regime, now);
        if regime.suspended {
            tracing::warn!(count = regime.count, window_days = regime.window_days, "REGIME SUSPENDED");
        }
        tracing::info!(
            %trade_date,
            fills = reconcile.fills.len(),
            alerts = alerts.alerts.len(),
            class_a = alerts.class_a_count,
            cash = %ledger.cash(),
            "batch complete"
        );

        Ok(BatchReport {
            trade_date,
            reconcile,
            benchmark,
            alerts,
            ingest,
            regime,
            ledger: ledger.snapshot(),
        })
    }

    /// Load, ingest `decisions`, flush. No market data involved.
    pub fn ingest_only(
        &self,
        store: &dyn LedgerStore,
        decisions: &str,
        as_of: NaiveDate,
    ) -> Result<IngestOnlyReport, BatchError> {
        let mut ledger = Self::load_ledger(store)?;
        let ingest = ingest_decisions(&mut ledger, &self.cfg, decisions, as_of);
        store.flush(&ledger)?;
        Ok(IngestOnlyReport {
            as_of,
            ingest,
            ledger: ledger.snapshot(),
        })
    }

    /// Read-only regime query.
    pub fn regime_status(&self, history_file: &TriggerHistoryFile, now: DateTime<Utc>) -> RegimeStatus {
        is_regime_suspended(&history_file.load(), &self.cfg.regime, now)
    }
}
