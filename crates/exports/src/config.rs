// crates/exports/src/config.rs
//! Tracker tuning knobs.

use std::time::Duration;

/// Default "freshly completed" window: terminal jobs completed within this
/// window are toast-eligible and shown in the recently-completed list.
pub const DEFAULT_FRESH_WINDOW: Duration = Duration::from_secs(10);

/// Default interval between notification-ledger reap passes.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(30);

/// Presentation tuning for the export tracker.
///
/// Both windows are display tuning, not protocol values; the at-most-once
/// notification guarantee holds for any setting because the ledger keeps a
/// job's id for as long as the job itself is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// How long after `completed_at` a terminal job counts as fresh.
    pub fresh_window: Duration,
    /// How often the reaper prunes the notification ledger.
    pub reap_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fresh_window: DEFAULT_FRESH_WINDOW,
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }
}

impl TrackerConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Honors `CLIPDECK_FRESH_WINDOW_SECS` and `CLIPDECK_REAP_INTERVAL_SECS`.
    pub fn from_env() -> Self {
        Self {
            fresh_window: env_secs("CLIPDECK_FRESH_WINDOW_SECS", DEFAULT_FRESH_WINDOW),
            reap_interval: env_secs("CLIPDECK_REAP_INTERVAL_SECS", DEFAULT_REAP_INTERVAL),
        }
    }
}

fn env_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
