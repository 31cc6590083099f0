// crates/types/src/update.rs
//! Inbound signal shapes: partial push updates and recovery snapshots.
//!
//! Push delivery is at-least-once and unordered, so everything except the
//! job id is optional. `JobUpdate::from_json` is the decode boundary where
//! malformed payloads are rejected; the reconciler drops them silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::{ExportJob, JobMetadata, JobStatus};

/// Why a raw push payload could not be decoded into a [`JobUpdate`].
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update is missing a jobId")]
    MissingJobId,

    #[error("update payload does not decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A partial state delivery for one job.
///
/// Absent fields mean "no change". `percent` is kept pre-clamp (`i64`) so the
/// registry owns the 0–100 clamping rule in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JobMetadata>,
}

impl JobUpdate {
    /// Decode a raw transport payload.
    ///
    /// The push source delivers loosely-validated JSON; nested
    /// `progress.percent` / `progress.message` are flattened here so both
    /// the nested wire shape and the flat one decode to the same update.
    pub fn from_json(raw: &serde_json::Value) -> Result<JobUpdate, UpdateError> {
        let mut update: JobUpdate = serde_json::from_value(raw.clone())?;
        if update.job_id.is_empty() {
            return Err(UpdateError::MissingJobId);
        }
        if let Some(progress) = raw.get("progress") {
            if update.percent.is_none() {
                update.percent = progress.get("percent").and_then(|p| p.as_i64());
            }
            if update.message.is_none() {
                update.message = progress
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from);
            }
        }
        Ok(update)
    }
}

impl From<&ExportJob> for JobUpdate {
    /// View a full record (e.g. a snapshot entry) as an update, so the one
    /// set of registry merge rules covers both delivery paths.
    fn from(job: &ExportJob) -> Self {
        JobUpdate {
            job_id: job.job_id.clone(),
            status: Some(job.status),
            percent: Some(i64::from(job.progress.percent)),
            message: Some(job.progress.message.clone()),
            started_at: Some(job.started_at),
            completed_at: job.completed_at,
            error: job.error.clone(),
            metadata: Some(job.metadata.clone()),
        }
    }
}

/// Authoritative full-state sync delivered on (re)connect.
///
/// `tombstones` names jobs the server no longer knows about; they are the
/// only way a snapshot removes local state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySnapshot {
    #[serde(default)]
    pub jobs: Vec<ExportJob>,
    #[serde(default)]
    pub tombstones: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_flat_update() {
        let raw = json!({
            "jobId": "x1",
            "status": "processing",
            "percent": 40,
            "message": "Encoding"
        });
        let update = JobUpdate::from_json(&raw).unwrap();
        assert_eq!(update.job_id, "x1");
        assert_eq!(update.status, Some(JobStatus::Processing));
        assert_eq!(update.percent, Some(40));
        assert_eq!(update.message.as_deref(), Some("Encoding"));
    }

    #[test]
    fn decodes_nested_progress_shape() {
        let raw = json!({
            "jobId": "x1",
            "status": "processing",
            "progress": { "percent": 73, "message": "Muxing audio" }
        });
        let update = JobUpdate::from_json(&raw).unwrap();
        assert_eq!(update.percent, Some(73));
        assert_eq!(update.message.as_deref(), Some("Muxing audio"));
    }

    #[test]
    fn flat_fields_win_over_nested() {
        let raw = json!({
            "jobId": "x1",
            "percent": 10,
            "progress": { "percent": 99 }
        });
        let update = JobUpdate::from_json(&raw).unwrap();
        assert_eq!(update.percent, Some(10));
    }

    #[test]
    fn missing_job_id_is_rejected() {
        let raw = json!({ "status": "complete" });
        assert!(matches!(
            JobUpdate::from_json(&raw),
            Err(UpdateError::Decode(_))
        ));
    }

    #[test]
    fn empty_job_id_is_rejected() {
        let raw = json!({ "jobId": "", "status": "complete" });
        assert!(matches!(
            JobUpdate::from_json(&raw),
            Err(UpdateError::MissingJobId)
        ));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(JobUpdate::from_json(&json!("not an update")).is_err());
        assert!(JobUpdate::from_json(&json!(42)).is_err());
        assert!(JobUpdate::from_json(&json!(null)).is_err());
    }

    #[test]
    fn snapshot_defaults_to_empty() {
        let snapshot: RecoverySnapshot = serde_json::from_value(json!({})).unwrap();
        assert!(snapshot.jobs.is_empty());
        assert!(snapshot.tombstones.is_empty());
    }
}
