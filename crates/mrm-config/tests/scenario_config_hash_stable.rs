//! Scenario: config hash stability
//!
//! GREEN when:
//! - `load_layered_yaml_from_strings` called twice on the same inputs returns
//!   identical config_hash.
//! - Reordering keys within YAML doesn't change the hash (canonicalization).
//! - Different values produce different hashes.
//! - An overlay changes the hash and the merged value.

use mrm_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
benchmark_symbol: "VOO"
thresholds:
  single_day_drop_pct: 5.0
  near_target_pct: 10.0
regime:
  trigger_threshold: 5
  window_days: 10
"#;

/// Same content as BASE_YAML but with keys in different order.
const BASE_YAML_REORDERED: &str = r#"
regime:
  window_days: 10
  trigger_threshold: 5
thresholds:
  near_target_pct: 10.0
  single_day_drop_pct: 5.0
benchmark_symbol: "VOO"
"#;

const OVERLAY_YAML: &str = r#"
thresholds:
  single_day_drop_pct: 4.0
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        a.config_hash, b.config_hash,
        "canonicalization must make key order irrelevant"
    );
}

#[test]
fn overlay_changes_hash_and_value() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let layered = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, layered.config_hash);
    assert_eq!(
        layered.config_json["thresholds"]["single_day_drop_pct"],
        serde_json::json!(4.0)
    );
    // Sibling keys survive the merge.
    assert_eq!(
        layered.config_json["thresholds"]["near_target_pct"],
        serde_json::json!(10.0)
    );
}
