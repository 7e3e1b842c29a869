//! Per-run export directory: `<exports>/<trade_date>/<run_id>/`.
//!
//! - `manifest.json`: who/what/when of the run
//! - `summary.json`: the batch report, as produced by the runtime

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    /// `batch` or `ingest`.
    pub mode: String,
    pub trade_date: NaiveDate,
    pub git_hash: String,
    pub config_hash: String,
    pub host_fingerprint: String,
    pub created_at_utc: DateTime<Utc>,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub manifest_json: String,
    pub summary_json: String,
}

pub struct WriteRunArtifactsArgs<'a> {
    pub exports_root: &'a Path,
    pub schema_version: i32,
    pub run_id: Uuid,
    pub mode: &'a str,
    pub trade_date: NaiveDate,
    pub git_hash: &'a str,
    pub config_hash: &'a str,
    pub host_fingerprint: &'a str,
    pub created_at_utc: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WriteRunArtifactsResult {
    pub run_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Deterministic run id: the same mode, trade date and config always map to
/// the same directory, so re-running a day overwrites its artifacts.
pub fn derive_run_id(mode: &str, trade_date: NaiveDate, config_hash: &str) -> Uuid {
    let data = format!("mrm.run.v1|{mode}|{trade_date}|{config_hash}");
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, data.as_bytes())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| format!("serialize {what} failed"))?;
    fs::write(path, format!("{json}\n")).with_context(|| format!("write {what} failed: {}", path.display()))?;
    Ok(())
}

pub fn write_run_artifacts<S: Serialize + ?Sized>(
    args: WriteRunArtifactsArgs<'_>,
    summary: &S,
) -> Result<WriteRunArtifactsResult> {
    let run_dir = args
        .exports_root
        .join(args.trade_date.format("%Y-%m-%d").to_string())
        .join(args.run_id.to_string());
    fs::create_dir_all(&run_dir).with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let manifest = RunManifest {
        schema_version: args.schema_version,
        run_id: args.run_id,
        mode: args.mode.to_string(),
        trade_date: args.trade_date,
        git_hash: args.git_hash.to_string(),
        config_hash: args.config_hash.to_string(),
        host_fingerprint: args.host_fingerprint.to_string(),
        created_at_utc: args.created_at_utc,
        artifacts: ArtifactList {
            manifest_json: "manifest.json".to_string(),
            summary_json: "summary.json".to_string(),
        },
    };

    let manifest_path = run_dir.join("manifest.json");
    write_json(&manifest_path, &manifest, "manifest")?;
    let summary_path = run_dir.join("summary.json");
    write_json(&summary_path, summary, "summary")?;

    Ok(WriteRunArtifactsResult {
        run_dir,
        manifest_path,
        summary_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 26).unwrap()
    }

    #[test]
    fn run_id_is_deterministic() {
        assert_eq!(derive_run_id("batch", day(), "abc"), derive_run_id("batch", day(), "abc"));
        assert_ne!(derive_run_id("batch", day(), "abc"), derive_run_id("ingest", day(), "abc"));
    }

    #[test]
    fn writes_manifest_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let run_id = derive_run_id("batch", day(), "abc");
        let res = write_run_artifacts(
            WriteRunArtifactsArgs {
                exports_root: dir.path(),
                schema_version: 1,
                run_id,
                mode: "batch",
                trade_date: day(),
                git_hash: "UNKNOWN",
                config_hash: "abc",
                host_fingerprint: "host|user|linux|x86_64",
                created_at_utc: Utc::now(),
            },
            &serde_json::json!({"fills": 1}),
        )
        .unwrap();

        assert_eq!(res.run_dir, dir.path().join("2026-01-26").join(run_id.to_string()));
        let manifest: RunManifest =
            serde_json::from_str(&fs::read_to_string(&res.manifest_path).unwrap()).unwrap();
        assert_eq!(manifest.run_id, run_id);
        assert_eq!(manifest.artifacts.summary_json, "summary.json");

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&res.summary_path).unwrap()).unwrap();
        assert_eq!(summary["fills"], 1);
    }
}
