// crates/exports/src/view.rs
//! Pure projection of registry state into what the indicator renders.
//!
//! Recomputed on every read, with no cached derived state, so the views can
//! never go stale relative to the registry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clipdeck_types::ExportJob;

use crate::registry::ExportRegistry;

/// Display-ready aggregate over the registry.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorView {
    /// Non-terminal jobs, most recently started first.
    pub active: Vec<ExportJob>,
    /// The most recently started active job, shown in the collapsed pill.
    pub primary: Option<ExportJob>,
    /// Terminal jobs completed within the fresh window, newest first.
    pub recently_completed: Vec<ExportJob>,
    /// The indicator is suppressed entirely while nothing is active, even if
    /// terminal entries remain available in the expanded history.
    pub visible: bool,
}

/// Shared "freshly completed" definition for the view and the notifier.
///
/// A terminal job is fresh while `completed_at` is no older than `window`.
/// A timestamp slightly in the future (server clock ahead) counts as fresh.
pub(crate) fn freshly_completed(job: &ExportJob, now: DateTime<Utc>, window: Duration) -> bool {
    match job.completed_at {
        Some(completed_at) if job.is_terminal() => {
            let window = chrono::Duration::milliseconds(window.as_millis() as i64);
            now.signed_duration_since(completed_at) <= window
        }
        _ => false,
    }
}

/// Compute the indicator view from current registry state.
pub fn project(registry: &ExportRegistry, now: DateTime<Utc>, fresh_window: Duration) -> IndicatorView {
    let mut active: Vec<ExportJob> = registry.all().filter(|j| j.is_active()).cloned().collect();
    // Most recently started first; job_id breaks exact timestamp ties so the
    // ordering (and the primary pick) is stable across recomputations.
    active.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });

    let mut recently_completed: Vec<ExportJob> = registry
        .all()
        .filter(|j| freshly_completed(j, now, fresh_window))
        .cloned()
        .collect();
    recently_completed.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });

    let primary = active.first().cloned();
    let visible = !active.is_empty();

    IndicatorView {
        active,
        primary,
        recently_completed,
        visible,
    }
}
