// crates/exports/src/reconcile.rs
//! Translation of inbound signals into registry mutations.
//!
//! Two delivery paths feed the registry: the one-shot recovery snapshot on
//! (re)connect, and the unordered/at-least-once push stream. Both must be
//! idempotent with respect to re-delivery; the registry's absorbing-terminal
//! merge does most of that work, this module adds the snapshot tombstone
//! rules and the malformed-payload drop policy.

use chrono::{DateTime, Utc};
use clipdeck_types::{JobUpdate, RecoverySnapshot};

use crate::registry::{ExportRegistry, UpsertOutcome};

/// Apply one push update. An unknown job id creates a new entry; push
/// delivery may race ahead of the recovery snapshot, so the update is
/// treated as authoritative rather than dropped.
pub fn apply_update(
    registry: &mut ExportRegistry,
    update: &JobUpdate,
    now: DateTime<Utc>,
) -> UpsertOutcome {
    registry.upsert(update, now)
}

/// Decode and apply a raw push payload.
///
/// Malformed payloads (no job id, wrong shape) are dropped without touching
/// the registry; nothing propagates to the caller.
pub fn apply_raw(
    registry: &mut ExportRegistry,
    raw: &serde_json::Value,
    now: DateTime<Utc>,
) -> Option<UpsertOutcome> {
    match JobUpdate::from_json(raw) {
        Ok(update) => Some(apply_update(registry, &update, now)),
        Err(err) => {
            tracing::debug!(error = %err, "dropping malformed push update");
            None
        }
    }
}

/// Result of folding a recovery snapshot into the registry.
#[derive(Debug, Default)]
pub struct SnapshotOutcome {
    /// Upserts that actually changed or created an entry.
    pub upserts: Vec<UpsertOutcome>,
    /// Job ids removed because the snapshot tombstoned them.
    pub removed: Vec<String>,
}

/// Apply a server-authoritative recovery snapshot.
///
/// Every record is upserted through the normal merge rules, so a stale
/// snapshot cannot revert a locally-terminal job. Local entries the snapshot
/// does not mention are retained (they may be ahead of a reconnect race);
/// only an explicit tombstone removes a local entry, and then only while it
/// is non-terminal; terminal entries are user-visible history and leave
/// through dismissal.
pub fn apply_snapshot(
    registry: &mut ExportRegistry,
    snapshot: &RecoverySnapshot,
    now: DateTime<Utc>,
) -> SnapshotOutcome {
    let mut outcome = SnapshotOutcome::default();

    for record in &snapshot.jobs {
        let upsert = registry.upsert(&JobUpdate::from(record), now);
        if upsert.changed {
            outcome.upserts.push(upsert);
        }
    }

    for job_id in &snapshot.tombstones {
        let locally_terminal = registry
            .get(job_id)
            .map(|job| job.is_terminal())
            .unwrap_or(true);
        if locally_terminal {
            continue;
        }
        if registry.remove(job_id).is_some() {
            tracing::debug!(job_id = %job_id, "removed tombstoned job from registry");
            outcome.removed.push(job_id.clone());
        }
    }

    outcome
}
