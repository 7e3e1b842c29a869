//! mrm-config
//!
//! Layered YAML configuration for the tracker.
//! - Built-in defaults (watchlist, targets, exit criteria, thresholds,
//!   regime policy) embedded from `defaults/tracker.yaml`
//! - Overlays deep-merged in order; later documents win, arrays replace
//! - Canonical JSON + SHA-256 `config_hash` identifies the effective config
//! - Typed [`TrackerConfig`] with unknown keys rejected and `validate()`

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

mod tracker;

pub use tracker::{
    AlertThresholds, RegimePolicy, Strategy, TrackerConfig, WatchlistEntry, MAX_WINDOW_DAYS,
};

/// The built-in configuration document.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../defaults/tracker.yaml");

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Deserialize and validate the effective document.
    pub fn tracker(&self) -> Result<TrackerConfig> {
        let cfg: TrackerConfig = serde_json::from_value(self.config_json.clone())
            .context("config does not match the tracker schema")?;
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty overlay file parses as null; treat it as "no changes".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Built-in defaults with the given overlay files layered on top.
pub fn load_with_overlays(paths: &[&str]) -> Result<(TrackerConfig, LoadedConfig)> {
    let mut docs: Vec<String> = vec![DEFAULT_CONFIG_YAML.to_string()];
    for p in paths {
        docs.push(
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?,
        );
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml_from_strings(&doc_refs)?;
    let cfg = loaded.tracker()?;
    Ok((cfg, loaded))
}

/// The built-in configuration alone.
pub fn default_config() -> Result<TrackerConfig> {
    load_layered_yaml_from_strings(&[DEFAULT_CONFIG_YAML])?.tracker()
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json's default Map is ordered by key, so compact serialization is
    // canonical regardless of YAML key order.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    hex::encode(out)
}
