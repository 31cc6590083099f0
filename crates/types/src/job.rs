// crates/types/src/job.rs
//! Wire model for one tracked export job.
//!
//! These are the records the export indicator renders: full job state as the
//! tracker holds it, serialized camelCase for the frontend and exported to
//! TypeScript via ts-rs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle status of an export job.
///
/// `Complete` and `Error` are terminal: once a job reaches either, no later
/// update may move it anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../ui/src/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Complete,
    Error,
}

impl JobStatus {
    /// Whether this status is absorbing (no further transitions permitted).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

/// Render progress while a job is non-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../ui/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Completion percentage, always within 0–100.
    pub percent: u8,
    /// Server-supplied step description (e.g. "Encoding video…").
    #[serde(default)]
    pub message: String,
}

impl Progress {
    /// Clamp a raw wire percent into the valid 0–100 range.
    pub fn clamp_percent(raw: i64) -> u8 {
        raw.clamp(0, 100) as u8
    }
}

/// Display-only attributes carried through the tracker unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../ui/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Human-readable project name shown in the indicator and toasts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Export kind label (e.g. "clip", "highlight reel").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

impl JobMetadata {
    /// Overlay `other` on top of `self`: present fields win, absent fields
    /// leave the existing value untouched.
    pub fn merge_from(&mut self, other: &JobMetadata) {
        if other.project_id.is_some() {
            self.project_id = other.project_id.clone();
        }
        if other.project_name.is_some() {
            self.project_name = other.project_name.clone();
        }
        if other.job_type.is_some() {
            self.job_type = other.job_type.clone();
        }
    }
}

/// Full state of one export job as tracked client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../ui/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    /// Opaque unique identifier, stable for the job's lifetime.
    pub job_id: String,
    pub status: JobStatus,
    /// Meaningful only while non-terminal; frozen once the job is terminal.
    pub progress: Progress,
    /// Set once at creation, never mutated afterwards.
    pub started_at: DateTime<Utc>,
    /// Stamped exactly once, on the first transition into a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Present only when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: JobMetadata,
}

impl ExportJob {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this job is still running (pending or processing).
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
