//! mrm-alerts
//!
//! Rule-based alerting over the daily market snapshot, plus the regime
//! monitor that watches the density of sharp-drop triggers.
//!
//! - [`detector`]: four independent rules per watchlist symbol; pure, no IO
//! - [`regime`]: trailing-window count over the trigger history; pure read
//! - [`history`]: the trigger history and its JSON file
//!
//! Time is always passed in by the caller (`now`); nothing here reads the
//! wall clock.

pub mod detector;
pub mod history;
pub mod regime;

pub use detector::{detect_alerts, Alert, AlertScan, RuleOutcomes, NO_TARGET_DISTANCE};
pub use history::{TriggerHistory, TriggerHistoryFile};
pub use regime::{is_regime_suspended, RegimeStatus};
