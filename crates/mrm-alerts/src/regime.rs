use chrono::{DateTime, Duration, Utc};
use mrm_config::RegimePolicy;
use serde::Serialize;

use crate::TriggerHistory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RegimeStatus {
    pub suspended: bool,
    /// Class-A triggers strictly inside the trailing window.
    pub count: usize,
    pub threshold: usize,
    pub window_days: i64,
}

/// Count history entries strictly newer than `now - window_days`; the
/// regime is suspended when that count reaches the policy threshold.
/// A window reaching past the representable range covers all history.
pub fn is_regime_suspended(
    history: &TriggerHistory,
    policy: &RegimePolicy,
    now: DateTime<Utc>,
) -> RegimeStatus {
    let cutoff = Duration::try_days(policy.window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let count = history.entries().iter().filter(|ts| **ts > cutoff).count();
    RegimeStatus {
        suspended: count >= policy.trigger_threshold,
        count,
        threshold: policy.trigger_threshold,
        window_days: policy.window_days,
    }
}
