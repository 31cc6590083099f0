// crates/exports/src/tracker.rs
//! Single-writer façade over registry + ledger.
//!
//! Every mutation is a synchronous state transition that returns the
//! [`ExportEvent`]s it produced, so the embedding runtime can forward them
//! to subscribers (the SSE layer in production, assertions in tests). The
//! tracker is an explicitly owned container, not an ambient singleton, and
//! it takes the current instant from its caller, which is what makes the
//! 10s/30s window behavior testable without wall-clock waits.

use chrono::{DateTime, Utc};
use clipdeck_types::{ExportJob, JobUpdate, Notification, RecoverySnapshot};
use serde::Serialize;

use crate::config::TrackerConfig;
use crate::notify::NotificationLedger;
use crate::reconcile;
use crate::registry::ExportRegistry;
use crate::view::{self, IndicatorView};

/// Registry change broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportEvent {
    /// A job was created or one of its fields changed.
    JobUpserted { job: ExportJob },
    /// A job left tracking (dismissal or snapshot tombstone).
    JobRemoved {
        #[serde(rename = "jobId")]
        job_id: String,
    },
    /// A terminal transition produced its one toast.
    Notified { notification: Notification },
}

/// The export-progress tracking core.
pub struct ExportTracker {
    registry: ExportRegistry,
    ledger: NotificationLedger,
    config: TrackerConfig,
}

impl ExportTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            registry: ExportRegistry::new(),
            ledger: NotificationLedger::new(),
            config,
        }
    }

    /// Apply one decoded push update.
    pub fn apply_update(&mut self, update: &JobUpdate, now: DateTime<Utc>) -> Vec<ExportEvent> {
        let outcome = reconcile::apply_update(&mut self.registry, update, now);
        let mut events = Vec::new();
        if outcome.changed {
            events.push(ExportEvent::JobUpserted { job: outcome.job });
        }
        self.collect_toasts(now, &mut events);
        events
    }

    /// Decode and apply a raw push payload; malformed input yields nothing.
    pub fn apply_raw(&mut self, raw: &serde_json::Value, now: DateTime<Utc>) -> Vec<ExportEvent> {
        let mut events = Vec::new();
        if let Some(outcome) = reconcile::apply_raw(&mut self.registry, raw, now) {
            if outcome.changed {
                events.push(ExportEvent::JobUpserted { job: outcome.job });
            }
            self.collect_toasts(now, &mut events);
        }
        events
    }

    /// Fold in a recovery snapshot (startup or reconnect).
    pub fn apply_snapshot(
        &mut self,
        snapshot: &RecoverySnapshot,
        now: DateTime<Utc>,
    ) -> Vec<ExportEvent> {
        let outcome = reconcile::apply_snapshot(&mut self.registry, snapshot, now);
        let mut events = Vec::new();
        for upsert in outcome.upserts {
            events.push(ExportEvent::JobUpserted { job: upsert.job });
        }
        for job_id in outcome.removed {
            events.push(ExportEvent::JobRemoved { job_id });
        }
        self.collect_toasts(now, &mut events);
        events
    }

    /// Explicit user dismissal of a tracked entry. The underlying export
    /// continues server-side regardless; only local tracking ends.
    pub fn dismiss(&mut self, job_id: &str) -> Vec<ExportEvent> {
        match self.registry.remove(job_id) {
            Some(job) => {
                tracing::info!(job_id = %job.job_id, "export dismissed");
                vec![ExportEvent::JobRemoved {
                    job_id: job.job_id,
                }]
            }
            None => Vec::new(),
        }
    }

    /// Reaper tick: prune ledger entries whose job is gone. Returns how many
    /// were dropped. The registry itself is never time-evicted; visible
    /// history stays until the user dismisses it.
    pub fn reap(&mut self) -> usize {
        self.ledger.prune(&self.registry)
    }

    /// Recompute the indicator view from current state.
    pub fn view(&self, now: DateTime<Utc>) -> IndicatorView {
        view::project(&self.registry, now, self.config.fresh_window)
    }

    pub fn registry(&self) -> &ExportRegistry {
        &self.registry
    }

    /// Whether a toast has already been emitted for this job id.
    pub fn has_notified(&self, job_id: &str) -> bool {
        self.ledger.has_notified(job_id)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn collect_toasts(&mut self, now: DateTime<Utc>, events: &mut Vec<ExportEvent>) {
        for notification in self.ledger.scan(&self.registry, now, self.config.fresh_window) {
            events.push(ExportEvent::Notified { notification });
        }
    }
}

impl Default for ExportTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdeck_types::JobStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        "2026-08-01T12:00:00Z".parse().unwrap()
    }

    fn toast_count(events: &[ExportEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, ExportEvent::Notified { .. }))
            .count()
    }

    #[test]
    fn duplicate_update_changes_nothing_after_first() {
        let mut tracker = ExportTracker::default();
        let update = JobUpdate {
            job_id: "x1".into(),
            status: Some(JobStatus::Processing),
            percent: Some(40),
            ..Default::default()
        };

        let first = tracker.apply_update(&update, t0());
        assert_eq!(first.len(), 1);

        let second = tracker.apply_update(&update, t0());
        assert!(second.is_empty(), "idempotent re-delivery emits no events");
    }

    #[test]
    fn terminal_update_emits_upsert_and_one_toast() {
        let mut tracker = ExportTracker::default();
        tracker.apply_update(
            &JobUpdate {
                job_id: "x1".into(),
                status: Some(JobStatus::Processing),
                ..Default::default()
            },
            t0(),
        );

        let events = tracker.apply_update(
            &JobUpdate {
                job_id: "x1".into(),
                status: Some(JobStatus::Complete),
                ..Default::default()
            },
            t0() + chrono::Duration::seconds(5),
        );
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ExportEvent::JobUpserted { .. }));
        assert_eq!(toast_count(&events), 1);
    }

    #[test]
    fn malformed_raw_payload_is_silent() {
        let mut tracker = ExportTracker::default();
        assert!(tracker.apply_raw(&json!({ "percent": 50 }), t0()).is_empty());
        assert!(tracker.registry().is_empty());
    }

    #[test]
    fn dismiss_unknown_job_is_noop() {
        let mut tracker = ExportTracker::default();
        assert!(tracker.dismiss("ghost").is_empty());
    }

    #[test]
    fn reap_after_dismissal_forgets_the_job() {
        let mut tracker = ExportTracker::default();
        tracker.apply_update(
            &JobUpdate {
                job_id: "x4".into(),
                status: Some(JobStatus::Complete),
                ..Default::default()
            },
            t0(),
        );
        assert_eq!(tracker.reap(), 0, "ledger entry stays while job is tracked");

        tracker.dismiss("x4");
        assert_eq!(tracker.reap(), 1);
    }

    #[test]
    fn event_serialization_is_tagged() {
        let event = ExportEvent::JobRemoved {
            job_id: "x1".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"job_removed","jobId":"x1"}"#);
    }
}
