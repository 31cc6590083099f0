// crates/types/src/notification.rs
//! Toast payloads handed to the notification sink.
//!
//! The sink (frontend toast layer) owns display and dismissal; the tracker
//! is fire-and-forget toward it and guarantees at most one notification per
//! job's terminal transition.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How long a success toast stays on screen.
pub const SUCCESS_TOAST_MS: u32 = 5_000;
/// How long a failure toast stays on screen.
pub const ERROR_TOAST_MS: u32 = 8_000;

/// Fallback failure message when the job carries no error text.
pub const GENERIC_ERROR_MESSAGE: &str = "Export failed unexpectedly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../ui/src/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// One user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../ui/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
    /// The job this toast reports on.
    pub job_id: String,
}
