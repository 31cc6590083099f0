// crates/exports/src/notify.rs
//! At-most-once toast accounting for terminal transitions.
//!
//! The ledger records which job ids have already produced a toast in this
//! process lifetime. It is scanned after every registry change and pruned by
//! the reaper once the corresponding job leaves the registry, so it cannot
//! grow past the set of tracked jobs.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clipdeck_types::{
    ExportJob, JobStatus, Notification, NotificationKind, ERROR_TOAST_MS, GENERIC_ERROR_MESSAGE,
    SUCCESS_TOAST_MS,
};

use crate::registry::ExportRegistry;
use crate::view::freshly_completed;

/// Set of job ids whose terminal transition has already been announced.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    notified: HashSet<String>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect toasts for freshly-completed jobs not yet announced, and
    /// record them. Re-observed entries are skipped, so any number of
    /// duplicate terminal deliveries yields exactly one toast per job.
    pub fn scan(
        &mut self,
        registry: &ExportRegistry,
        now: DateTime<Utc>,
        fresh_window: Duration,
    ) -> Vec<Notification> {
        let mut toasts = Vec::new();
        for job in registry.all() {
            if !freshly_completed(job, now, fresh_window) {
                continue;
            }
            if self.notified.contains(&job.job_id) {
                continue;
            }
            self.notified.insert(job.job_id.clone());
            toasts.push(build_notification(job));
        }
        toasts
    }

    /// Drop ledger entries whose job is no longer tracked. Returns how many
    /// were pruned. Called from the reaper tick.
    pub fn prune(&mut self, registry: &ExportRegistry) -> usize {
        let before = self.notified.len();
        self.notified.retain(|job_id| registry.contains(job_id));
        before - self.notified.len()
    }

    pub fn has_notified(&self, job_id: &str) -> bool {
        self.notified.contains(job_id)
    }

    pub fn len(&self) -> usize {
        self.notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }
}

/// Compose the toast for one terminal job.
fn build_notification(job: &ExportJob) -> Notification {
    let kind_label = job.metadata.job_type.as_deref().unwrap_or("export");
    let project = job
        .metadata
        .project_name
        .as_deref()
        .or(job.metadata.project_id.as_deref());

    match job.status {
        JobStatus::Error => Notification {
            kind: NotificationKind::Error,
            title: "Export failed".into(),
            message: job
                .error
                .clone()
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.into()),
            duration_ms: ERROR_TOAST_MS,
            job_id: job.job_id.clone(),
        },
        _ => Notification {
            kind: NotificationKind::Success,
            title: "Export complete".into(),
            message: match project {
                Some(project) => format!("Your {kind_label} for {project} is ready"),
                None => format!("Your {kind_label} is ready"),
            },
            duration_ms: SUCCESS_TOAST_MS,
            job_id: job.job_id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdeck_types::{JobMetadata, JobUpdate};
    use pretty_assertions::assert_eq;

    const WINDOW: Duration = Duration::from_secs(10);

    fn t0() -> DateTime<Utc> {
        "2026-08-01T12:00:00Z".parse().unwrap()
    }

    fn complete_update(job_id: &str) -> JobUpdate {
        JobUpdate {
            job_id: job_id.into(),
            status: Some(JobStatus::Complete),
            ..Default::default()
        }
    }

    #[test]
    fn one_toast_per_terminal_job() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        registry.upsert(&complete_update("x1"), t0());
        let toasts = ledger.scan(&registry, t0(), WINDOW);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Success);
        assert_eq!(toasts[0].job_id, "x1");

        // Re-observation (e.g. after a duplicate push) emits nothing.
        registry.upsert(&complete_update("x1"), t0());
        assert!(ledger.scan(&registry, t0(), WINDOW).is_empty());
        assert!(ledger.has_notified("x1"));
    }

    #[test]
    fn non_terminal_jobs_are_never_announced() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        registry.upsert(
            &JobUpdate {
                job_id: "x1".into(),
                status: Some(JobStatus::Processing),
                ..Default::default()
            },
            t0(),
        );
        assert!(ledger.scan(&registry, t0(), WINDOW).is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn stale_completion_is_outside_the_window() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        // Discovered via snapshot with a completion 5 minutes ago: no toast.
        registry.upsert(
            &JobUpdate {
                completed_at: Some(t0() - chrono::Duration::minutes(5)),
                ..complete_update("old")
            },
            t0(),
        );
        assert!(ledger.scan(&registry, t0(), WINDOW).is_empty());
    }

    #[test]
    fn error_toast_carries_error_text() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        registry.upsert(
            &JobUpdate {
                job_id: "x2".into(),
                status: Some(JobStatus::Error),
                error: Some("disk full".into()),
                ..Default::default()
            },
            t0(),
        );
        let toasts = ledger.scan(&registry, t0(), WINDOW);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Error);
        assert_eq!(toasts[0].message, "disk full");
        assert_eq!(toasts[0].duration_ms, ERROR_TOAST_MS);
    }

    #[test]
    fn error_toast_falls_back_to_generic_message() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        registry.upsert(
            &JobUpdate {
                job_id: "x2".into(),
                status: Some(JobStatus::Error),
                ..Default::default()
            },
            t0(),
        );
        let toasts = ledger.scan(&registry, t0(), WINDOW);
        assert_eq!(toasts[0].message, GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn success_toast_uses_job_type_and_project_label() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        registry.upsert(
            &JobUpdate {
                metadata: Some(JobMetadata {
                    project_name: Some("Launch video".into()),
                    job_type: Some("highlight reel".into()),
                    ..Default::default()
                }),
                ..complete_update("x1")
            },
            t0(),
        );
        let toasts = ledger.scan(&registry, t0(), WINDOW);
        assert_eq!(toasts[0].title, "Export complete");
        assert_eq!(toasts[0].message, "Your highlight reel for Launch video is ready");
        assert_eq!(toasts[0].duration_ms, SUCCESS_TOAST_MS);
    }

    #[test]
    fn prune_drops_ids_for_removed_jobs_only() {
        let mut registry = ExportRegistry::new();
        let mut ledger = NotificationLedger::new();

        registry.upsert(&complete_update("keep"), t0());
        registry.upsert(&complete_update("dismissed"), t0());
        ledger.scan(&registry, t0(), WINDOW);
        assert_eq!(ledger.len(), 2);

        registry.remove("dismissed");
        assert_eq!(ledger.prune(&registry), 1);
        assert!(ledger.has_notified("keep"));
        assert!(!ledger.has_notified("dismissed"));
    }
}
