//! `init`, `run`, `ingest` and `regime` handlers.
//!
//! Results go to stdout as `key=value` lines; diagnostics go through
//! `tracing` on stderr.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use mrm_alerts::TriggerHistoryFile;
use mrm_artifacts::{derive_run_id, write_run_artifacts, WriteRunArtifactsArgs};
use mrm_ledger::parse_micros;
use mrm_md::source_for_path;
use mrm_runtime::{BatchReport, BatchRunner, IngestOnlyReport};
use mrm_store::CsvLedgerStore;
use serde::Serialize;
use std::path::Path;

use super::{get_git_hash, host_fingerprint, load_config, read_text};

const SCHEMA_VERSION: i32 = 1;

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

pub fn init(data_dir: &Path, cash: &str, config_paths: &[String]) -> Result<()> {
    let (cfg, loaded) = load_config(config_paths)?;
    let cash = parse_micros(cash.trim()).with_context(|| format!("invalid --cash '{cash}'"))?;
    if cash.is_negative() {
        anyhow::bail!("invalid --cash '{cash}': must be >= 0");
    }

    let store = CsvLedgerStore::new(data_dir);
    let ledger = store.init(cfg.symbols(), cash)?;

    println!("initialised=true");
    println!("data_dir={}", data_dir.display());
    println!("symbols={}", ledger.positions().len());
    println!("cash={}", ledger.cash());
    println!("config_hash={}", loaded.config_hash);
    Ok(())
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(
    data_dir: &Path,
    market: &Path,
    decision: Option<&Path>,
    config_paths: &[String],
    exports: Option<&Path>,
) -> Result<()> {
    let (cfg, loaded) = load_config(config_paths)?;
    let store = CsvLedgerStore::new(data_dir);
    let history = TriggerHistoryFile::in_dir(data_dir);

    let source = source_for_path(market)?;
    tracing::info!(source = %source.describe(), "loading market data");
    let snapshot = source
        .load()
        .with_context(|| format!("load market data: {}", source.describe()))?;

    // Unreadable decision text does not stop the batch; it ingests nothing.
    let decisions = decision.map(|path| {
        read_text(path).unwrap_or_else(|e| {
            tracing::error!(path = %path.display(), error = %format!("{e:#}"), "decision file unreadable; ingesting nothing");
            String::new()
        })
    });

    let runner = BatchRunner::new(cfg);
    let now = Utc::now();
    let report = runner.run_batch(&store, &history, snapshot.as_ref(), decisions.as_deref(), now)?;

    print_batch(&report);
    if let Some(root) = exports {
        export("batch", root, report.trade_date, &loaded.config_hash, &report)?;
    }
    Ok(())
}

fn print_batch(r: &BatchReport) {
    println!("trade_date={}", r.trade_date);
    println!("fills={}", r.reconcile.fills.len());
    println!("expired={}", r.reconcile.expirations.len());
    println!("kept={}", r.reconcile.kept.len());
    println!("blocked={}", r.reconcile.blocked().count());
    println!("skipped_orders={}", r.reconcile.skipped.len());
    println!("cash={}", r.ledger.cash);
    println!("portfolio_value={}", r.benchmark.portfolio_value);
    println!("alpha={:.4}", r.benchmark.alpha);
    println!("alerts={}", r.alerts.alerts.len());
    println!("class_a={}", r.alerts.class_a_count);
    for a in &r.alerts.alerts {
        println!("alert={} signals=\"{}\"", a.symbol, a.signals.join("; "));
    }
    if let Some(ingest) = &r.ingest {
        print_ingest_counts(ingest.added, ingest.skipped, ingest.rejected);
    }
    println!("regime_suspended={}", r.regime.suspended);
    println!("regime_count={}", r.regime.count);
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

pub fn ingest(
    data_dir: &Path,
    decision: &Path,
    as_of: Option<NaiveDate>,
    config_paths: &[String],
    exports: Option<&Path>,
) -> Result<()> {
    let (cfg, loaded) = load_config(config_paths)?;
    let store = CsvLedgerStore::new(data_dir);
    let text = read_text(decision)?;
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());

    let report: IngestOnlyReport = BatchRunner::new(cfg).ingest_only(&store, &text, as_of)?;

    println!("as_of={}", report.as_of);
    print_ingest_counts(report.ingest.added, report.ingest.skipped, report.ingest.rejected);
    for o in &report.ingest.outcomes {
        println!("decision={} verdict={:?} reason=\"{}\"", o.ticker, o.verdict, o.reason);
    }
    println!("pending_orders={}", report.ledger.pending_count);
    if let Some(root) = exports {
        export("ingest", root, as_of, &loaded.config_hash, &report)?;
    }
    Ok(())
}

fn print_ingest_counts(added: usize, skipped: usize, rejected: usize) {
    println!("decisions_added={added}");
    println!("decisions_skipped={skipped}");
    println!("decisions_rejected={rejected}");
}

// ---------------------------------------------------------------------------
// regime
// ---------------------------------------------------------------------------

pub fn regime(data_dir: &Path, config_paths: &[String]) -> Result<()> {
    let (cfg, _) = load_config(config_paths)?;
    let history = TriggerHistoryFile::in_dir(data_dir);
    let status = BatchRunner::new(cfg).regime_status(&history, Utc::now());

    println!("regime_suspended={}", status.suspended);
    println!("trigger_count={}", status.count);
    println!("threshold={}", status.threshold);
    println!("window_days={}", status.window_days);
    Ok(())
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

fn export<S: Serialize>(
    mode: &str,
    exports_root: &Path,
    trade_date: NaiveDate,
    config_hash: &str,
    summary: &S,
) -> Result<()> {
    let git_hash = get_git_hash().unwrap_or_else(|| "UNKNOWN".to_string());
    let run_id = derive_run_id(mode, trade_date, config_hash);
    let art = write_run_artifacts(
        WriteRunArtifactsArgs {
            exports_root,
            schema_version: SCHEMA_VERSION,
            run_id,
            mode,
            trade_date,
            git_hash: &git_hash,
            config_hash,
            host_fingerprint: &host_fingerprint(),
            created_at_utc: Utc::now(),
        },
        summary,
    )?;
    println!("run_id={run_id}");
    println!("run_dir={}", art.run_dir.display());
    Ok(())
}
