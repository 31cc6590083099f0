// crates/exports/src/registry.rs
//! Single source of truth for tracked export jobs.
//!
//! The registry is a plain map mutated from one logical thread of control
//! (snapshot delivery, push delivery, reaper tick all run on the monitor's
//! signal loop), so it carries no interior mutability. All merge and
//! transition rules live in [`ExportRegistry::upsert`]:
//!
//! - terminal is absorbing: once `complete`/`error`, only metadata merges;
//! - `completed_at` is stamped at most once, on the first terminal
//!   transition, preferring a server-supplied timestamp over `now`;
//! - `started_at` is set at creation and never touched again;
//! - progress overwrites unconditionally while non-terminal, clamped 0–100.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clipdeck_types::{ExportJob, JobStatus, JobUpdate, Progress};

/// What an upsert did to the registry.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    /// The resulting job state after the merge.
    pub job: ExportJob,
    /// Whether the entry was created by this upsert.
    pub created: bool,
    /// Whether any field actually changed (false for duplicate deliveries).
    pub changed: bool,
}

/// Process-wide, lifecycle-scoped map from job id to job state.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    jobs: HashMap<String, ExportJob>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or merge an entry for `update.job_id`.
    ///
    /// `now` is the observation time, used to stamp `completed_at` when the
    /// update reports a terminal transition without supplying a timestamp,
    /// and `started_at` when a brand-new job omits one.
    pub fn upsert(&mut self, update: &JobUpdate, now: DateTime<Utc>) -> UpsertOutcome {
        match self.jobs.get_mut(&update.job_id) {
            Some(existing) => {
                let before = existing.clone();
                merge(existing, update, now);
                let changed = *existing != before;
                UpsertOutcome {
                    job: existing.clone(),
                    created: false,
                    changed,
                }
            }
            None => {
                let job = create(update, now);
                self.jobs.insert(update.job_id.clone(), job.clone());
                UpsertOutcome {
                    job,
                    created: true,
                    changed: true,
                }
            }
        }
    }

    pub fn get(&self, job_id: &str) -> Option<&ExportJob> {
        self.jobs.get(job_id)
    }

    /// Delete an entry unconditionally. No-op (returns `None`) if absent.
    pub fn remove(&mut self, job_id: &str) -> Option<ExportJob> {
        self.jobs.remove(job_id)
    }

    /// All tracked jobs, in no particular order. Callers that need recency
    /// must sort by `started_at` themselves (the view projector does).
    pub fn all(&self) -> impl Iterator<Item = &ExportJob> {
        self.jobs.values()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.contains_key(job_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Build a fresh entry from the first observation of a job id.
fn create(update: &JobUpdate, now: DateTime<Utc>) -> ExportJob {
    let status = update.status.unwrap_or(JobStatus::Pending);
    let completed_at = status
        .is_terminal()
        .then(|| update.completed_at.unwrap_or(now));
    ExportJob {
        job_id: update.job_id.clone(),
        status,
        progress: Progress {
            percent: update.percent.map(Progress::clamp_percent).unwrap_or(0),
            message: update.message.clone().unwrap_or_default(),
        },
        started_at: update.started_at.unwrap_or(now),
        completed_at,
        error: if status == JobStatus::Error {
            update.error.clone()
        } else {
            None
        },
        metadata: update.metadata.clone().unwrap_or_default(),
    }
}

/// Merge a partial update into an existing entry.
fn merge(existing: &mut ExportJob, update: &JobUpdate, now: DateTime<Utc>) {
    // Metadata merges regardless of lifecycle stage.
    if let Some(metadata) = &update.metadata {
        existing.metadata.merge_from(metadata);
    }

    if existing.status.is_terminal() {
        // Terminal is absorbing: status, progress, completed_at and error are
        // frozen. Duplicate terminal deliveries land here and change nothing.
        if update.status.is_some() || update.percent.is_some() {
            tracing::debug!(
                job_id = %existing.job_id,
                status = ?existing.status,
                "ignoring status/progress on terminal job"
            );
        }
        return;
    }

    // Progress overwrites unconditionally while non-terminal. Out-of-order
    // delivery may regress percent; that is accepted at this layer.
    if let Some(percent) = update.percent {
        existing.progress.percent = Progress::clamp_percent(percent);
    }
    if let Some(message) = &update.message {
        existing.progress.message = message.clone();
    }

    if let Some(status) = update.status {
        existing.status = status;
        if status.is_terminal() && existing.completed_at.is_none() {
            existing.completed_at = Some(update.completed_at.unwrap_or(now));
        }
        if status == JobStatus::Error {
            existing.error = update.error.clone();
        }
    }
}
